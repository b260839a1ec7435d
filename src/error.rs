//! Error types for the htmlpress library.
//!
//! Two distinct error types reflect two distinct layers:
//!
//! * [`HtmlPressError`] — **Conversion-level**: the conversion cannot
//!   produce a PDF at all (no browser installed, unparsable markup, every
//!   render attempt failed). Returned as `Err(HtmlPressError)` from the
//!   top-level `convert*` functions.
//!
//! * [`crate::renderer::RenderError`] — **Renderer-level**: a single render
//!   attempt against the browser failed. Transient variants (busy browser,
//!   timed-out navigation) are retried by the orchestrator; the rest
//!   surface immediately as [`HtmlPressError::Render`].
//!
//! The separation keeps the retry policy out of the error types themselves:
//! [`crate::renderer::RenderError::is_transient`] classifies, the retry
//! combinator in [`crate::retry`] decides.
//!
//! Cleanup failures are deliberately absent from this enum. A temp file
//! that could not be deleted must never fail an otherwise-successful
//! conversion; the artifact manager logs it and moves on.

use crate::renderer::RenderError;
use thiserror::Error;

/// All errors returned by the htmlpress library.
#[derive(Debug, Error)]
pub enum HtmlPressError {
    // ── Browser discovery ─────────────────────────────────────────────────
    /// Browser discovery is not implemented for the current operating
    /// system. Pass an explicit executable path instead.
    #[error(
        "Browser discovery is not supported on {os}.\n\
         Set an explicit path with ConversionConfig::builder().browser_path(...)."
    )]
    UnsupportedPlatform { os: &'static str },

    /// No Chrome or Chromium executable was found on this host.
    #[error(
        "No Chrome or Chromium executable found.\n\
         Install Google Chrome or Chromium, or set an explicit path with\n\
         ConversionConfig::builder().browser_path(...)."
    )]
    BrowserNotFound,

    // ── Preprocessing ─────────────────────────────────────────────────────
    /// The input could not be processed as HTML markup. Never retried.
    #[error("Input could not be processed as HTML: {detail}")]
    InvalidMarkup { detail: String },

    // ── Scratch storage ───────────────────────────────────────────────────
    /// Could not create the scratch directory or write the intermediate file.
    #[error("Scratch storage failure at '{path}': {source}")]
    Scratch {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Rendering ─────────────────────────────────────────────────────────
    /// Every render attempt failed with a transient error.
    ///
    /// `causes` holds the distinct underlying failures (deduplicated by
    /// message text), so diagnostics can show every failure class that
    /// occurred rather than only the last one.
    #[error("Rendering failed after {attempts} attempts: {}", format_causes(.causes))]
    RetryExhausted {
        attempts: u32,
        causes: Vec<RenderError>,
    },

    /// The renderer failed with a non-transient error; retrying would not help.
    #[error("Renderer error: {0}")]
    Render(#[from] RenderError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_causes(causes: &[RenderError]) -> String {
    if causes.is_empty() {
        return "no recorded cause".to_string();
    }
    causes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_exhausted_lists_every_cause() {
        let e = HtmlPressError::RetryExhausted {
            attempts: 5,
            causes: vec![
                RenderError::Launch {
                    detail: "browser busy".into(),
                },
                RenderError::Timeout { secs: 30 },
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("5 attempts"), "got: {msg}");
        assert!(msg.contains("browser busy"), "got: {msg}");
        assert!(msg.contains("30"), "got: {msg}");
    }

    #[test]
    fn unsupported_platform_display() {
        let e = HtmlPressError::UnsupportedPlatform { os: "macos" };
        assert!(e.to_string().contains("macos"));
    }

    #[test]
    fn invalid_markup_display() {
        let e = HtmlPressError::InvalidMarkup {
            detail: "unexpected end of input".into(),
        };
        assert!(e.to_string().contains("unexpected end of input"));
    }
}

//! The renderer contract and its headless-Chromium implementation.
//!
//! The orchestrator in [`crate::convert`] only knows the narrow
//! [`Renderer`] trait: hand over a [`RenderTarget`] and a
//! [`PageSettings`], get PDF bytes back. Everything DevTools-protocol
//! specific stays behind [`ChromiumRenderer`], so tests can substitute a
//! mock and alternative engines can be plugged in without touching the
//! conversion pipeline.
//!
//! ## Why a fresh browser per render?
//!
//! A crashed or wedged tab cannot poison the next conversion, and
//! concurrent conversions never contend for tabs. Launching Chromium costs
//! a few hundred milliseconds — acceptable for a conversion service, and
//! the retry layer above treats a failed launch as transient anyway.

use crate::settings::PageSettings;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Arguments always passed to the browser, appended after caller-supplied
/// ones without re-adding duplicates.
const DEFAULT_ARGS: &[&str] = &["--disable-dev-shm-usage", "--ignore-certificate-errors"];

/// What the renderer should load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    /// A remote (or any navigable) URI, loaded as-is.
    Uri(String),
    /// A local file, loaded via a `file://` URL.
    File(PathBuf),
    /// Raw markup, injected directly into a blank page. Used by the
    /// raw-markup fallback policy; resources with relative paths will not
    /// resolve in this mode.
    Markup(String),
}

impl RenderTarget {
    /// The URL the browser should navigate to, if this target has one.
    pub fn navigation_url(&self) -> Option<String> {
        match self {
            RenderTarget::Uri(uri) => Some(uri.clone()),
            RenderTarget::File(path) => Some(file_url(path)),
            RenderTarget::Markup(_) => None,
        }
    }
}

/// Build a `file://` URL from a local path.
fn file_url(path: &Path) -> String {
    let s = path.display().to_string();
    #[cfg(windows)]
    {
        format!("file:///{}", s.replace('\\', "/"))
    }
    #[cfg(not(windows))]
    {
        format!("file://{s}")
    }
}

/// A single render attempt failed.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The browser process could not be launched or configured.
    #[error("failed to launch browser: {detail}")]
    Launch { detail: String },

    /// Navigation to the target did not complete.
    #[error("navigation failed: {detail}")]
    Navigation { detail: String },

    /// The DevTools print call failed.
    #[error("print-to-PDF failed: {detail}")]
    Protocol { detail: String },

    /// The attempt exceeded the per-attempt render timeout.
    #[error("render attempt timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The target itself is unusable (e.g. an unparsable URI). Not retried.
    #[error("invalid render target: {detail}")]
    InvalidTarget { detail: String },
}

impl RenderError {
    /// Whether the orchestrator should retry after this error.
    pub fn is_transient(&self) -> bool {
        !matches!(self, RenderError::InvalidTarget { .. })
    }
}

/// Turns a render target into PDF bytes.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        target: &RenderTarget,
        settings: &PageSettings,
    ) -> Result<Vec<u8>, RenderError>;
}

/// Production renderer: one headless Chromium per render call.
pub struct ChromiumRenderer {
    executable: PathBuf,
    args: Vec<String>,
}

impl ChromiumRenderer {
    /// Create a renderer for the given executable with the browser
    /// arguments merged from `extra_args` and the built-in defaults.
    pub fn new(executable: impl Into<PathBuf>, extra_args: &[String]) -> Self {
        Self {
            executable: executable.into(),
            args: merge_args(extra_args),
        }
    }

    /// The merged browser arguments this renderer launches with.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    async fn launch(&self) -> Result<(Browser, tokio::task::JoinHandle<()>), RenderError> {
        let config = BrowserConfig::builder()
            .chrome_executable(self.executable.clone())
            .args(self.args.clone())
            .build()
            .map_err(|detail| RenderError::Launch { detail })?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch {
                detail: e.to_string(),
            })?;

        // The handler drives all CDP traffic; it must be polled for the
        // lifetime of the browser.
        let events = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok((browser, events))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(
        &self,
        target: &RenderTarget,
        settings: &PageSettings,
    ) -> Result<Vec<u8>, RenderError> {
        let (mut browser, events) = self.launch().await?;

        let result = print_page(&browser, target, settings).await;

        // Shut the browser down regardless of the print outcome; a leaked
        // Chromium process outlives the conversion otherwise.
        browser.close().await.ok();
        browser.wait().await.ok();
        events.abort();

        result
    }
}

async fn print_page(
    browser: &Browser,
    target: &RenderTarget,
    settings: &PageSettings,
) -> Result<Vec<u8>, RenderError> {
    let page = match target {
        RenderTarget::Markup(html) => {
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| RenderError::Navigation {
                    detail: e.to_string(),
                })?;
            page.set_content(html.as_str())
                .await
                .map_err(|e| RenderError::Navigation {
                    detail: e.to_string(),
                })?;
            page
        }
        _ => {
            let url = target
                .navigation_url()
                .expect("non-markup targets always have a URL");
            trace!(%url, "navigating");
            browser
                .new_page(url)
                .await
                .map_err(|e| RenderError::Navigation {
                    detail: e.to_string(),
                })?
        }
    };

    page.wait_for_navigation()
        .await
        .map_err(|e| RenderError::Navigation {
            detail: e.to_string(),
        })?;

    let bytes = page
        .pdf(print_params(settings))
        .await
        .map_err(|e| RenderError::Protocol {
            detail: e.to_string(),
        })?;

    debug!(bytes = bytes.len(), "rendered PDF");
    Ok(bytes)
}

/// Map [`PageSettings`] onto the DevTools `Page.printToPDF` parameters.
fn print_params(s: &PageSettings) -> PrintToPdfParams {
    PrintToPdfParams {
        landscape: Some(s.landscape),
        display_header_footer: Some(s.display_header_footer),
        print_background: Some(s.print_background),
        scale: Some(s.scale),
        paper_width: Some(s.paper_width),
        paper_height: Some(s.paper_height),
        margin_top: Some(s.margin_top),
        margin_bottom: Some(s.margin_bottom),
        margin_left: Some(s.margin_left),
        margin_right: Some(s.margin_right),
        page_ranges: s.page_ranges.clone(),
        header_template: s.header_template.clone(),
        footer_template: s.footer_template.clone(),
        prefer_css_page_size: Some(s.prefer_css_page_size),
        ..Default::default()
    }
}

/// Merge caller-supplied arguments with [`DEFAULT_ARGS`], preserving caller
/// order and skipping duplicates. On Linux the sandbox is disabled — the
/// common container deployment has no user namespace for it.
pub fn merge_args(extra: &[String]) -> Vec<String> {
    let mut args: Vec<String> = Vec::with_capacity(extra.len() + DEFAULT_ARGS.len() + 1);
    for arg in extra {
        if !args.contains(arg) {
            args.push(arg.clone());
        }
    }
    for arg in DEFAULT_ARGS {
        if !args.iter().any(|a| a == arg) {
            args.push((*arg).to_string());
        }
    }
    if cfg!(target_os = "linux") && !args.iter().any(|a| a == "--no-sandbox") {
        args.push("--no-sandbox".to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_appends_defaults_without_duplicates() {
        let extra = vec![
            "--disable-dev-shm-usage".to_string(),
            "--lang=en-US".to_string(),
        ];
        let args = merge_args(&extra);

        assert_eq!(
            args.iter()
                .filter(|a| *a == "--disable-dev-shm-usage")
                .count(),
            1
        );
        assert!(args.contains(&"--lang=en-US".to_string()));
        assert!(args.contains(&"--ignore-certificate-errors".to_string()));
    }

    #[test]
    fn merge_dedupes_caller_arguments() {
        let extra = vec!["--lang=en-US".to_string(), "--lang=en-US".to_string()];
        let args = merge_args(&extra);
        assert_eq!(args.iter().filter(|a| *a == "--lang=en-US").count(), 1);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn linux_always_disables_sandbox_once() {
        let args = merge_args(&["--no-sandbox".to_string()]);
        assert_eq!(args.iter().filter(|a| *a == "--no-sandbox").count(), 1);

        let args = merge_args(&[]);
        assert!(args.contains(&"--no-sandbox".to_string()));
    }

    #[test]
    fn navigation_url_for_each_target() {
        assert_eq!(
            RenderTarget::Uri("https://example.com".into()).navigation_url(),
            Some("https://example.com".to_string())
        );
        assert!(RenderTarget::Markup("<p>hi</p>".into())
            .navigation_url()
            .is_none());

        #[cfg(not(windows))]
        assert_eq!(
            RenderTarget::File("/tmp/page.html".into()).navigation_url(),
            Some("file:///tmp/page.html".to_string())
        );
    }

    #[test]
    fn transience_classification() {
        assert!(RenderError::Launch {
            detail: "busy".into()
        }
        .is_transient());
        assert!(RenderError::Timeout { secs: 30 }.is_transient());
        assert!(!RenderError::InvalidTarget {
            detail: "bad uri".into()
        }
        .is_transient());
    }
}

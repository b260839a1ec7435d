//! Conversion entry points: compose discovery, preprocessing, scratch
//! storage, retry, and the renderer into one request/response operation.
//!
//! ## State machine per call
//!
//! ```text
//! request ──▶ resolve renderer ──▶ resolve target ──▶ render (retried) ──▶ bytes
//!                                   │ inline: preprocess + temp file      │
//!                                   │ uri:    content used directly       │
//!                                   └──────────── cleanup ◀───────────────┘
//! ```
//!
//! The temp artifact is released on **every** exit path — success,
//! renderer failure, retry exhaustion — by capturing the render outcome
//! first and releasing before the `?` fires. The artifact's `Drop` impl
//! backs this up for panics.

use crate::browser;
use crate::config::{ConversionConfig, FallbackPolicy};
use crate::error::HtmlPressError;
use crate::pipeline::artifact::ScratchDir;
use crate::pipeline::preprocess;
use crate::renderer::{ChromiumRenderer, RenderError, RenderTarget, Renderer};
use crate::retry::{self, RetryError, RetryOptions};
use crate::settings::PageSettings;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to convert.
#[derive(Debug, Clone)]
enum Source {
    /// A URI the browser loads directly; no preprocessing, no temp file.
    Uri(String),
    /// Inline markup, preprocessed and staged through the scratch directory.
    Markup(String),
}

/// One conversion request. Immutable once constructed; owned by a single
/// in-flight conversion call.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    source: Source,
    settings: PageSettings,
    browser_args: Vec<String>,
}

impl ConversionRequest {
    /// Convert the document at `uri` (http, https, or file).
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            source: Source::Uri(uri.into()),
            settings: PageSettings::default(),
            browser_args: Vec::new(),
        }
    }

    /// Convert inline HTML markup (a full document or a bare fragment).
    pub fn from_html(markup: impl Into<String>) -> Self {
        Self {
            source: Source::Markup(markup.into()),
            settings: PageSettings::default(),
            browser_args: Vec::new(),
        }
    }

    /// Replace the default page settings.
    pub fn with_settings(mut self, settings: PageSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add per-request browser arguments. Merged before config-level
    /// arguments; duplicates of the built-in defaults are not re-added.
    pub fn with_browser_args(
        mut self,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.browser_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The page settings this request will be rendered with.
    pub fn settings(&self) -> &PageSettings {
        &self.settings
    }

    /// Whether the content is a URI rather than inline markup.
    pub fn is_uri(&self) -> bool {
        matches!(self.source, Source::Uri(_))
    }
}

/// Convert an HTML request to PDF bytes.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// * [`HtmlPressError::BrowserNotFound`] / [`HtmlPressError::UnsupportedPlatform`]
///   when no renderer can be resolved
/// * [`HtmlPressError::InvalidMarkup`] for unprocessable inline input (not retried)
/// * [`HtmlPressError::RetryExhausted`] when every render attempt failed;
///   its `causes` list every distinct failure
pub async fn convert(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<Vec<u8>, HtmlPressError> {
    let renderer = resolve_renderer(request, config)?;

    // ── Step 1: Resolve mode ─────────────────────────────────────────────
    let (target, artifact, processed) = match &request.source {
        Source::Uri(uri) => {
            info!(%uri, "converting uri");
            (RenderTarget::Uri(uri.clone()), None, None)
        }
        // ── Step 2: Preprocess + stage (inline mode only) ────────────────
        Source::Markup(raw) => {
            info!(bytes = raw.len(), "converting inline markup");
            let processed = preprocess::normalize(raw)?;
            let scratch = ScratchDir::new(config.scratch_dir.as_deref())?;
            let artifact = scratch.write_html(&processed)?;
            (artifact.render_target(), Some(artifact), Some(processed))
        }
    };

    // ── Step 3/4: Render (retried), then fallback policy ─────────────────
    let outcome = render_with_retry(
        renderer.as_ref(),
        &target,
        processed.as_deref(),
        &request.settings,
        config,
    )
    .await;

    // ── Step 5: Cleanup, unconditionally ─────────────────────────────────
    if let Some(artifact) = artifact {
        artifact.release();
    }

    // ── Step 6: Result ───────────────────────────────────────────────────
    let bytes = outcome?;
    debug!(bytes = bytes.len(), "conversion complete");
    Ok(bytes)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<Vec<u8>, HtmlPressError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| HtmlPressError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(request, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the renderer, from most-specific to least-specific:
///
/// 1. **Pre-built renderer** (`config.renderer`) — used as-is. For tests
///    and callers pooling browser instances.
/// 2. **Explicit executable** (`config.browser_path`) — skips discovery.
/// 3. **Discovery** ([`browser::find`]) — registry and well-known install
///    locations; absence here is fatal because there is nothing to render
///    with.
fn resolve_renderer(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<Arc<dyn Renderer>, HtmlPressError> {
    if let Some(renderer) = &config.renderer {
        return Ok(Arc::clone(renderer));
    }

    let executable = match &config.browser_path {
        Some(path) => path.clone(),
        None => browser::find()?.ok_or(HtmlPressError::BrowserNotFound)?,
    };

    let mut args = request.browser_args.clone();
    args.extend(config.extra_args.iter().cloned());
    Ok(Arc::new(ChromiumRenderer::new(executable, &args)))
}

/// Drive the renderer through the bounded retry executor, applying the
/// per-attempt timeout and, on exhaustion, the configured fallback policy.
async fn render_with_retry(
    renderer: &dyn Renderer,
    target: &RenderTarget,
    processed_markup: Option<&str>,
    settings: &PageSettings,
    config: &ConversionConfig,
) -> Result<Vec<u8>, HtmlPressError> {
    let timeout = config.render_timeout;
    let op = move || async move {
        match tokio::time::timeout(timeout, renderer.render(target, settings)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout {
                secs: timeout.as_secs(),
            }),
        }
    };

    let options = RetryOptions {
        max_attempts: config.retry_attempts,
        interval: config.retry_interval,
    };

    match retry::execute(op, options, RenderError::is_transient).await {
        Ok(bytes) => Ok(bytes),
        Err(RetryError::Fatal(e)) => Err(HtmlPressError::Render(e)),
        Err(RetryError::Exhausted { attempts, causes }) => {
            if config.fallback == FallbackPolicy::RawMarkup {
                if let Some(markup) = processed_markup {
                    warn!(
                        attempts,
                        "file-based rendering exhausted; falling back to raw markup"
                    );
                    let fallback_target = RenderTarget::Markup(markup.to_string());
                    return match renderer.render(&fallback_target, settings).await {
                        Ok(bytes) => Ok(bytes),
                        Err(e) => {
                            let mut causes = causes;
                            let msg = e.to_string();
                            if !causes.iter().any(|c| c.to_string() == msg) {
                                causes.push(e);
                            }
                            Err(HtmlPressError::RetryExhausted { attempts, causes })
                        }
                    };
                }
            }
            Err(HtmlPressError::RetryExhausted { attempts, causes })
        }
    }
}

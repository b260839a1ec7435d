//! Configuration types for HTML-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`],
//! built via its [`ConversionConfigBuilder`]. Keeping every knob in one
//! struct makes it trivial to share configs across threads and to see at a
//! glance why two deployments behave differently.
//!
//! An earlier design kept the retry count and platform flag in statics;
//! that made concurrent callers with different needs impossible, so every
//! option now travels with the config instance instead.

use crate::error::HtmlPressError;
use crate::renderer::Renderer;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// What to do when every render attempt against the temp-file reference
/// has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Fail with [`HtmlPressError::RetryExhausted`]. The default: the
    /// error carries every distinct cause, and callers decide what to do.
    #[default]
    FailFast,
    /// For inline conversions, re-render once passing the preprocessed
    /// markup directly to the browser, bypassing the temp file. Relative
    /// resource references will not resolve in this mode; it trades
    /// fidelity for a last-resort answer.
    RawMarkup,
}

/// Configuration for HTML-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use htmlpress::ConversionConfig;
/// use std::time::Duration;
///
/// let config = ConversionConfig::builder()
///     .retry_attempts(3)
///     .retry_interval(Duration::from_millis(250))
///     .extra_arg("--lang=en-US")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Render attempts per conversion. Default: 5.
    ///
    /// Transient renderer failures — a busy browser process, a navigation
    /// that timed out under load — are expected and should not fail the
    /// whole request on the first hit, so the conversion bound is higher
    /// than the generic retry default of 3.
    pub retry_attempts: u32,

    /// Delay awaited between render attempts. Default: none.
    ///
    /// This is a real suspension point, not a detached timer; with many
    /// concurrent conversions a short interval gives a wedged browser
    /// process time to recover instead of hammering it.
    pub retry_interval: Option<Duration>,

    /// Per-attempt render timeout. Default: 30 s.
    ///
    /// Applied to each attempt individually, so a conversion with 5
    /// attempts may take up to 5× this (plus intervals) before failing.
    pub render_timeout: Duration,

    /// Additional browser arguments, appended after per-request arguments
    /// and deduplicated against the built-in defaults.
    pub extra_args: Vec<String>,

    /// Explicit browser executable, bypassing discovery.
    pub browser_path: Option<PathBuf>,

    /// Pre-constructed renderer. Takes precedence over `browser_path` and
    /// discovery; used by tests and by callers that pool browsers.
    pub renderer: Option<Arc<dyn Renderer>>,

    /// Base directory for scratch files. Default: the system temp location.
    pub scratch_dir: Option<PathBuf>,

    /// Behaviour after retry exhaustion. Default: [`FallbackPolicy::FailFast`].
    pub fallback: FallbackPolicy,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 5,
            retry_interval: None,
            render_timeout: Duration::from_secs(30),
            extra_args: Vec::new(),
            browser_path: None,
            renderer: None,
            scratch_dir: None,
            fallback: FallbackPolicy::default(),
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_interval", &self.retry_interval)
            .field("render_timeout", &self.render_timeout)
            .field("extra_args", &self.extra_args)
            .field("browser_path", &self.browser_path)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn Renderer>"))
            .field("scratch_dir", &self.scratch_dir)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn retry_attempts(mut self, n: u32) -> Self {
        self.config.retry_attempts = n;
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.config.retry_interval = Some(interval);
        self
    }

    pub fn render_timeout(mut self, timeout: Duration) -> Self {
        self.config.render_timeout = timeout;
        self
    }

    pub fn extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    pub fn extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser_path = Some(path.into());
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    pub fn fallback(mut self, policy: FallbackPolicy) -> Self {
        self.config.fallback = policy;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, HtmlPressError> {
        let c = &self.config;
        if c.retry_attempts == 0 {
            return Err(HtmlPressError::InvalidConfig(
                "retry_attempts must be ≥ 1".into(),
            ));
        }
        if c.render_timeout.is_zero() {
            return Err(HtmlPressError::InvalidConfig(
                "render_timeout must be non-zero".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.retry_attempts, 5);
        assert!(c.retry_interval.is_none());
        assert_eq!(c.fallback, FallbackPolicy::FailFast);
    }

    #[test]
    fn builder_rejects_zero_attempts() {
        let result = ConversionConfig::builder().retry_attempts(0).build();
        assert!(matches!(result, Err(HtmlPressError::InvalidConfig(_))));
    }

    #[test]
    fn builder_accumulates_args() {
        let c = ConversionConfig::builder()
            .extra_arg("--lang=en-US")
            .extra_args(["--a", "--b"])
            .build()
            .unwrap();
        assert_eq!(c.extra_args, vec!["--lang=en-US", "--a", "--b"]);
    }
}

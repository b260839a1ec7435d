//! # htmlpress
//!
//! Convert HTML markup or web pages to PDF using a headless
//! Chrome/Chromium browser.
//!
//! ## Why this crate?
//!
//! Pure-Rust layout engines cover a fraction of real-world HTML/CSS;
//! anything with web fonts, flexbox, or JavaScript-rendered content comes
//! out wrong. Instead this crate drives the same engine the page was
//! written for — a headless Chromium over the DevTools protocol — and
//! layers the operational plumbing on top: finding an installed browser,
//! normalising markup so output matches across platforms, staging inline
//! HTML through a scratch file, and retrying the flaky parts with bounded,
//! deduplicated failure reporting.
//!
//! ## Pipeline Overview
//!
//! ```text
//! request
//!  │
//!  ├─ 1. Locate      registry / well-known paths → browser executable
//!  ├─ 2. Preprocess  wrap fragments, inject reset styles   (inline only)
//!  ├─ 3. Stage       unique temp .html in the scratch dir  (inline only)
//!  ├─ 4. Render      headless browser prints to PDF, retried with backoff
//!  └─ 5. Cleanup     temp artifact released on every exit path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use htmlpress::{convert, ConversionConfig, ConversionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let request = ConversionRequest::from_html("<h1>Invoice #42</h1>");
//!     let pdf = convert(&request, &config).await?;
//!     std::fs::write("invoice.pdf", &pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `htmlpress` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! htmlpress = { version = "0.4", default-features = false }
//! ```
//!
//! ## Platform support
//!
//! | Platform | Discovery | Rendering |
//! |----------|-----------|-----------|
//! | Windows  | registry + program-files probing | ✓ |
//! | Linux    | standard executable directories  | ✓ |
//! | macOS    | not supported — pass `browser_path` explicitly | ✓ |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod browser;
pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod retry;
pub mod settings;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, FallbackPolicy};
pub use convert::{convert, convert_sync, ConversionRequest};
pub use error::HtmlPressError;
pub use pipeline::preprocess::{convert_pt_to_px, TargetPlatform};
pub use renderer::{ChromiumRenderer, RenderError, RenderTarget, Renderer};
pub use settings::PageSettings;

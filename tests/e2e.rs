//! End-to-end integration tests for htmlpress.
//!
//! These tests launch a real headless Chrome/Chromium and are gated behind
//! the `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested (and a browser is installed).
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use htmlpress::{convert, ConversionConfig, ConversionRequest, PageSettings};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set *and* a browser is discoverable.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        match htmlpress::browser::find() {
            Ok(Some(path)) => path,
            Ok(None) => {
                println!("SKIP — no Chrome/Chromium installed on this host");
                return;
            }
            Err(e) => {
                println!("SKIP — browser discovery unavailable: {e}");
                return;
            }
        }
    }};
}

fn scratch_base() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn scratch_files(base: &std::path::Path) -> Vec<PathBuf> {
    let dir = base.join("htmlpress");
    if !dir.exists() {
        return Vec::new();
    }
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

fn assert_is_pdf(bytes: &[u8], context: &str) {
    assert!(!bytes.is_empty(), "[{context}] PDF output is empty");
    assert!(
        bytes.starts_with(b"%PDF"),
        "[{context}] output does not start with the PDF signature, got: {:?}",
        &bytes[..bytes.len().min(8)]
    );
    println!("[{context}] ✓  {} bytes", bytes.len());
}

// ── Inline conversions ───────────────────────────────────────────────────────

#[tokio::test]
async fn inline_fragment_produces_pdf_and_clean_scratch_dir() {
    let _browser = e2e_skip_unless_ready!();
    let base = scratch_base();

    let config = ConversionConfig::builder()
        .scratch_dir(base.path())
        .build()
        .unwrap();
    let request = ConversionRequest::from_html("<p>hi</p>");

    let bytes = convert(&request, &config).await.expect("conversion");
    assert_is_pdf(&bytes, "inline fragment");

    assert!(
        scratch_files(base.path()).is_empty(),
        "scratch directory must be empty after conversion"
    );
}

#[tokio::test]
async fn inline_document_with_styles_renders() {
    let _browser = e2e_skip_unless_ready!();
    let base = scratch_base();

    let config = ConversionConfig::builder()
        .scratch_dir(base.path())
        .build()
        .unwrap();
    let html = r#"<html>
<head><style>h1 { color: #336699; font-size: 16px; }</style></head>
<body><h1>Quarterly Report</h1><table><tr><td>Q1</td><td>42</td></tr></table></body>
</html>"#;
    let request = ConversionRequest::from_html(html);

    let bytes = convert(&request, &config).await.expect("conversion");
    assert_is_pdf(&bytes, "styled document");
    assert!(scratch_files(base.path()).is_empty());
}

#[tokio::test]
async fn landscape_letter_settings_are_accepted() {
    let _browser = e2e_skip_unless_ready!();
    let base = scratch_base();

    let config = ConversionConfig::builder()
        .scratch_dir(base.path())
        .build()
        .unwrap();
    let mut settings = PageSettings::letter();
    settings.landscape = true;
    let request = ConversionRequest::from_html("<p>wide</p>").with_settings(settings);

    let bytes = convert(&request, &config).await.expect("conversion");
    assert_is_pdf(&bytes, "landscape letter");
}

// ── URI conversions ──────────────────────────────────────────────────────────

#[tokio::test]
async fn file_uri_conversion_uses_no_scratch_files() {
    let _browser = e2e_skip_unless_ready!();
    let base = scratch_base();

    // Stage a page outside the scratch directory and convert it by URI.
    let page = base.path().join("page.html");
    std::fs::write(&page, "<html><body><p>from disk</p></body></html>").unwrap();
    let uri = format!("file://{}", page.display());

    let config = ConversionConfig::builder()
        .scratch_dir(base.path())
        .build()
        .unwrap();
    let request = ConversionRequest::from_uri(uri);

    let bytes = convert(&request, &config).await.expect("conversion");
    assert_is_pdf(&bytes, "file uri");

    assert!(
        scratch_files(base.path()).is_empty(),
        "uri mode must not create scratch artifacts"
    );
    assert!(page.exists(), "uri mode must not delete the source file");
}

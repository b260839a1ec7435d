//! CLI binary for htmlpress.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionRequest` + `ConversionConfig` and writes the PDF bytes out.

use anyhow::{Context, Result};
use clap::Parser;
use htmlpress::{
    convert, ConversionConfig, ConversionRequest, FallbackPolicy, PageSettings,
};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "htmlpress",
    version,
    about = "Convert HTML markup or web pages to PDF via headless Chrome/Chromium",
    long_about = None
)]
struct Cli {
    /// Input: an HTML file path, an http(s):// URL, or '-' for stdin.
    input: String,

    /// Output PDF path.
    #[arg(short, long, default_value = "output.pdf")]
    output: PathBuf,

    /// Landscape orientation.
    #[arg(long)]
    landscape: bool,

    /// Paper size preset.
    #[arg(long, value_parser = ["a4", "letter"], default_value = "a4")]
    paper: String,

    /// Margin applied to all four sides, in inches.
    #[arg(long)]
    margin: Option<f64>,

    /// Skip background graphics.
    #[arg(long)]
    no_background: bool,

    /// Page scale factor (0.1–2.0).
    #[arg(long)]
    scale: Option<f64>,

    /// Page ranges to print, e.g. "1-3,5".
    #[arg(long)]
    page_ranges: Option<String>,

    /// Render attempts before giving up.
    #[arg(long, default_value_t = 5)]
    retries: u32,

    /// Delay between render attempts, in milliseconds.
    #[arg(long)]
    retry_interval_ms: Option<u64>,

    /// Per-attempt render timeout, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Browser executable path (skips discovery).
    #[arg(long, env = "CHROME_PATH")]
    browser: Option<PathBuf>,

    /// Extra browser argument; repeatable.
    #[arg(long = "chrome-arg")]
    chrome_args: Vec<String>,

    /// On retry exhaustion, re-render inline markup directly instead of
    /// failing (relative resources will not resolve).
    #[arg(long)]
    raw_fallback: bool,

    /// Increase log verbosity (-v: info, -vv: debug, -vvv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let request = build_request(&cli)?;
    let config = build_config(&cli)?;

    let pdf = convert(&request, &config).await?;

    std::fs::write(&cli.output, &pdf)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    eprintln!("{} ({} bytes)", cli.output.display(), pdf.len());
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_request(cli: &Cli) -> Result<ConversionRequest> {
    let request = if cli.input.starts_with("http://") || cli.input.starts_with("https://") {
        ConversionRequest::from_uri(&cli.input)
    } else if cli.input == "-" {
        let mut markup = String::new();
        std::io::stdin()
            .read_to_string(&mut markup)
            .context("failed to read markup from stdin")?;
        ConversionRequest::from_html(markup)
    } else {
        let markup = std::fs::read_to_string(&cli.input)
            .with_context(|| format!("failed to read {}", cli.input))?;
        ConversionRequest::from_html(markup)
    };

    Ok(request
        .with_settings(page_settings(cli))
        .with_browser_args(cli.chrome_args.clone()))
}

fn page_settings(cli: &Cli) -> PageSettings {
    let mut settings = match cli.paper.as_str() {
        "letter" => PageSettings::letter(),
        _ => PageSettings::a4(),
    };
    settings.landscape = cli.landscape;
    settings.print_background = !cli.no_background;
    if let Some(margin) = cli.margin {
        settings.margin_top = margin;
        settings.margin_bottom = margin;
        settings.margin_left = margin;
        settings.margin_right = margin;
    }
    if let Some(scale) = cli.scale {
        settings.scale = scale;
    }
    settings.page_ranges = cli.page_ranges.clone();
    settings
}

fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .retry_attempts(cli.retries)
        .render_timeout(Duration::from_secs(cli.timeout_secs));

    if let Some(ms) = cli.retry_interval_ms {
        builder = builder.retry_interval(Duration::from_millis(ms));
    }
    if let Some(path) = &cli.browser {
        builder = builder.browser_path(path.clone());
    }
    if cli.raw_fallback {
        builder = builder.fallback(FallbackPolicy::RawMarkup);
    }

    Ok(builder.build()?)
}

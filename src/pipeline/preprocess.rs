//! HTML preprocessing: normalise inline markup before rendering.
//!
//! ## Why preprocess at all?
//!
//! Callers submit anything from full documents to bare `<p>` fragments, and
//! the same markup must produce the same PDF whether the service runs on
//! Windows or in a Linux container. Preprocessing closes both gaps:
//!
//! - fragments are wrapped in a document shell with an explicit UTF-8
//!   content-type declaration, so multibyte text survives the file round-trip;
//! - a reset stylesheet pins box-sizing, margins, and the font family, with
//!   line-height and letter-spacing compensation applied on non-Windows
//!   hosts where the font metrics differ.
//!
//! The injected rules are *prepended* to any existing `<style>` content, so
//! author rules of equal specificity still win by appearing later in the
//! cascade. Author rules behind `!important` or higher specificity win
//! regardless; that is normal CSS behaviour, not something we fight.

use crate::error::HtmlPressError;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::cell::Cell;
use std::rc::Rc;

/// Host platform gate for [`convert_pt_to_px`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPlatform {
    Windows,
    Linux,
    MacOs,
}

impl TargetPlatform {
    /// Whether this is the platform the process is running on.
    pub fn is_current(self) -> bool {
        match self {
            TargetPlatform::Windows => cfg!(target_os = "windows"),
            TargetPlatform::Linux => cfg!(target_os = "linux"),
            TargetPlatform::MacOs => cfg!(target_os = "macos"),
        }
    }
}

fn invalid_markup(e: lol_html::errors::RewritingError) -> HtmlPressError {
    HtmlPressError::InvalidMarkup {
        detail: e.to_string(),
    }
}

/// Normalise inline markup for rendering.
///
/// Wraps fragments in a document shell, then injects the reset stylesheet:
/// prepended to the first `<style>` in `<head>` when one exists, otherwise
/// as a new `<style>` element appended to `<head>` (or prepended to
/// `<html>` for head-less documents).
///
/// # Errors
/// [`HtmlPressError::InvalidMarkup`] when the input cannot be processed as
/// markup. This is a fatal input error; it is never retried.
pub fn normalize(raw: &str) -> Result<String, HtmlPressError> {
    let html = ensure_document(raw);
    let css = reset_css();

    // First existing <style> in <head>: prepend our rules to its content.
    let injected = Rc::new(Cell::new(false));
    let pass = rewrite_str(
        &html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("head style", {
                let injected = Rc::clone(&injected);
                let css = css.clone();
                move |el| {
                    if !injected.get() {
                        injected.set(true);
                        el.prepend(&css, ContentType::Text);
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(invalid_markup)?;
    if injected.get() {
        return Ok(pass);
    }

    // No style element: create one at the end of <head>.
    let created = Rc::new(Cell::new(false));
    let style_block = format!("<style>{css}</style>");
    let pass = rewrite_str(
        &pass,
        RewriteStrSettings {
            element_content_handlers: vec![element!("head", {
                let created = Rc::clone(&created);
                let style_block = style_block.clone();
                move |el| {
                    if !created.get() {
                        created.set(true);
                        el.append(&style_block, ContentType::Html);
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(invalid_markup)?;
    if created.get() {
        return Ok(pass);
    }

    // Root element but no <head> (caller-supplied documents only; wrapped
    // fragments always carry one).
    rewrite_str(
        &pass,
        RewriteStrSettings {
            element_content_handlers: vec![element!("html", move |el| {
                el.prepend(&style_block, ContentType::Html);
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(invalid_markup)
}

/// Wrap markup lacking a root `<html>` element in a document shell.
fn ensure_document(raw: &str) -> String {
    if raw.to_ascii_lowercase().contains("<html") {
        return raw.to_string();
    }
    format!(
        "<html><head><meta http-equiv=\"Content-Type\" \
         content=\"text/html; charset=utf-8\"></head><body>{raw}</body></html>"
    )
}

/// The reset stylesheet. Line-height and letter-spacing compensation only
/// applies off-Windows, where the named font renders with looser metrics.
fn reset_css() -> String {
    let compensation = if cfg!(target_os = "windows") {
        ""
    } else {
        "\n    letter-spacing: -0.01em;\n    line-height: 1.4;"
    };
    format!(
        "\n\
         * {{\n    text-size-adjust: 100%;\n    border: 0;\n}}\n\
         \n\
         html,\nbody,\ntable {{\n    box-sizing: border-box;\n    \
         font-family: 'Microsoft YaHei';\n    margin: 0;\n    padding: 0;{compensation}\n}}\n"
    )
}

// ── pt → px ──────────────────────────────────────────────────────────────

static PT_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)pt").unwrap());

/// Replace every `<number>pt` token with its pixel equivalent at the
/// standard 96/72 screen-to-point ratio (`12pt` → `16px`, integer math).
///
/// When `gate` is set, the pass only applies if the process is running on
/// that platform; `None` applies unconditionally. Values without a
/// trailing `pt` unit are left untouched.
pub fn convert_pt_to_px(html: &str, gate: Option<TargetPlatform>) -> String {
    if let Some(platform) = gate {
        if !platform.is_current() {
            return html.to_string();
        }
    }
    PT_VALUE
        .replace_all(html, |caps: &Captures<'_>| match caps[1].parse::<u64>() {
            Ok(n) => format!("{}px", n * 96 / 72),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

//! Page settings forwarded to the renderer.
//!
//! The orchestration layer treats this struct as an opaque bag: it is
//! carried on the [`crate::convert::ConversionRequest`] and handed to the
//! renderer verbatim. Only the chromiumoxide implementation interprets the
//! fields, mapping them onto the DevTools `Page.printToPDF` parameters.
//! Defaults match Chrome's own print defaults (A4 portrait, ~1 cm margins,
//! backgrounds on).

use serde::{Deserialize, Serialize};

/// Print options for one conversion. All lengths are in inches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSettings {
    /// Paper width. Default: 8.27 (A4).
    pub paper_width: f64,
    /// Paper height. Default: 11.69 (A4).
    pub paper_height: f64,
    /// Landscape orientation. Default: false.
    pub landscape: bool,
    /// Top margin. Default: 0.39 (~1 cm).
    pub margin_top: f64,
    /// Bottom margin. Default: 0.39.
    pub margin_bottom: f64,
    /// Left margin. Default: 0.39.
    pub margin_left: f64,
    /// Right margin. Default: 0.39.
    pub margin_right: f64,
    /// Print background graphics. Default: true.
    pub print_background: bool,
    /// Page scale factor, 0.1–2.0. Default: 1.0.
    pub scale: f64,
    /// Page ranges, e.g. `"1-3,5"`. `None` prints all pages.
    pub page_ranges: Option<String>,
    /// Show the header and footer defined by the templates below.
    pub display_header_footer: bool,
    /// HTML template for the print header.
    pub header_template: Option<String>,
    /// HTML template for the print footer.
    pub footer_template: Option<String>,
    /// Let a CSS `@page` size rule override the paper size above.
    pub prefer_css_page_size: bool,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            paper_width: 8.27,
            paper_height: 11.69,
            landscape: false,
            margin_top: 0.39,
            margin_bottom: 0.39,
            margin_left: 0.39,
            margin_right: 0.39,
            print_background: true,
            scale: 1.0,
            page_ranges: None,
            display_header_footer: false,
            header_template: None,
            footer_template: None,
            prefer_css_page_size: false,
        }
    }
}

impl PageSettings {
    /// A4 portrait with Chrome's default margins.
    pub fn a4() -> Self {
        Self::default()
    }

    /// US Letter portrait.
    pub fn letter() -> Self {
        Self {
            paper_width: 8.5,
            paper_height: 11.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_a4_portrait() {
        let s = PageSettings::default();
        assert_eq!(s.paper_width, 8.27);
        assert!(!s.landscape);
        assert!(s.print_background);
        assert!(s.page_ranges.is_none());
    }

    #[test]
    fn deserialises_partial_payloads() {
        // Callers typically send only the fields they care about.
        let s: PageSettings = serde_json::from_str(r#"{"landscape": true}"#).unwrap();
        assert!(s.landscape);
        assert_eq!(s.paper_height, 11.69);
    }
}

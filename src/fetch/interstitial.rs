//! Interstitial confirmation-page parsing.
//!
//! When the sharing host cannot serve a file directly (large files, virus
//! scan warnings) it returns an HTML page with a hidden confirmation form
//! instead of the payload. This module scrapes that page for the fields
//! needed to synthesize the real download URL.
//!
//! The page format is a third-party convention this crate does not control,
//! so the scraping sits behind the [`InterstitialParser`] trait: one
//! implementation per observed page variant, addable without touching the
//! flow engine.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::filename::extension_from_display_name;

#[allow(clippy::expect_used)]
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex is valid")
}

static FORM_ACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"<form[^>]+action="([^"]+)""#));
static HIDDEN_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"<input type="hidden" name="id" value="([^"]+)""#));
static HIDDEN_EXPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"<input type="hidden" name="export" value="([^"]+)""#));
static HIDDEN_CONFIRM_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"<input type="hidden" name="confirm" value="([^"]+)""#)
});
static HIDDEN_UUID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"<input type="hidden" name="uuid" value="([^"]+)""#));
static HIDDEN_AT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"<input type="hidden" name="at" value="([^"]+)""#));
static ANCHOR_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"<a [^>]*href="[^"]*"[^>]*>([^<]+)</a>"#));

/// A download URL synthesized from interstitial confirmation fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// All confirmation fields (including `at`) were present; the URL is
    /// complete and no further round-trip is needed.
    Ready {
        /// The fully synthesized download URL.
        download_url: String,
        /// File extension inferred from the displayed filename.
        extension: String,
    },

    /// The `at` token was absent; the secondary sub-flow must fetch the
    /// payload through the partial URL.
    AwaitingToken {
        /// The download URL without the `at` fragment.
        download_url: String,
        /// File extension inferred from the displayed filename.
        extension: String,
    },
}

impl Confirmation {
    /// Returns the synthesized download URL regardless of variant.
    #[must_use]
    pub fn download_url(&self) -> &str {
        match self {
            Self::Ready { download_url, .. } | Self::AwaitingToken { download_url, .. } => {
                download_url
            }
        }
    }
}

/// Parses one observed interstitial page format into confirmation fields.
pub trait InterstitialParser: Send + Sync {
    /// Returns the parser's name (e.g. "form-page") for logging.
    fn name(&self) -> &str;

    /// Attempts to extract confirmation parameters from the page.
    ///
    /// Returns `None` when the page does not match this parser's format,
    /// in which case the body is treated as the payload itself.
    fn extract(&self, html: &str) -> Option<Confirmation>;
}

/// Parser for the hidden-form confirmation page variant.
///
/// Scrapes six independent fields: the form `action` attribute, four hidden
/// inputs (`id`, `export`, `confirm`, `uuid`) and the optional `at` token.
/// A download URL can only be synthesized when the first five are all
/// present; `at` decides whether the secondary sub-flow is needed.
#[derive(Debug, Default)]
pub struct FormPageParser;

impl FormPageParser {
    /// Creates a new form-page parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl InterstitialParser for FormPageParser {
    fn name(&self) -> &'static str {
        "form-page"
    }

    fn extract(&self, html: &str) -> Option<Confirmation> {
        let action = capture(&FORM_ACTION_RE, html)?;
        let id = capture(&HIDDEN_ID_RE, html)?;
        let export = capture(&HIDDEN_EXPORT_RE, html)?;
        let confirm = capture(&HIDDEN_CONFIRM_RE, html)?;
        let uuid = capture(&HIDDEN_UUID_RE, html)?;

        let display_name = capture(&ANCHOR_TEXT_RE, html);
        let extension = extension_from_display_name(display_name.as_deref());

        let download_url =
            format!("{action}?id={id}&export={export}&confirm={confirm}&uuid={uuid}");

        trace!(url = %download_url, extension = %extension, "interstitial fields extracted");

        match capture(&HIDDEN_AT_RE, html) {
            Some(at) => Some(Confirmation::Ready {
                download_url: format!("{download_url}&at={at}"),
                extension,
            }),
            None => Some(Confirmation::AwaitingToken {
                download_url,
                extension,
            }),
        }
    }
}

fn capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ACTION: &str = r#"<form id="download-form" action="https://drive.usercontent.google.com/download" method="get">"#;
    const ID: &str = r#"<input type="hidden" name="id" value="ID">"#;
    const EXPORT: &str = r#"<input type="hidden" name="export" value="EXPORT">"#;
    const CONFIRM: &str = r#"<input type="hidden" name="confirm" value="CONFIRM">"#;
    const UUID: &str = r#"<input type="hidden" name="uuid" value="UUID">"#;
    const AT: &str = r#"<input type="hidden" name="at" value="AT">"#;
    const ANCHOR: &str = r#"<a class="file" href="/open?id=ID">archive.tar.gz</a>"#;

    fn page(parts: &[&str]) -> String {
        format!("<html><body>{}</body></html>", parts.join("\n"))
    }

    #[test]
    fn test_all_fields_with_at_is_ready() {
        let html = page(&[ACTION, ID, EXPORT, CONFIRM, UUID, AT, ANCHOR]);
        let parsed = FormPageParser::new().extract(&html).unwrap();
        match parsed {
            Confirmation::Ready {
                download_url,
                extension,
            } => {
                assert!(download_url.ends_with("&at=AT"), "got: {download_url}");
                assert_eq!(extension, ".gz");
            }
            Confirmation::AwaitingToken { .. } => panic!("expected Ready"),
        }
    }

    #[test]
    fn test_exact_url_concatenation() {
        let html = page(&[ACTION, ID, EXPORT, CONFIRM, UUID, AT]);
        let parsed = FormPageParser::new().extract(&html).unwrap();
        assert_eq!(
            parsed.download_url(),
            "https://drive.usercontent.google.com/download?id=ID&export=EXPORT&confirm=CONFIRM&uuid=UUID&at=AT"
        );
    }

    #[test]
    fn test_missing_at_awaits_token() {
        let html = page(&[ACTION, ID, EXPORT, CONFIRM, UUID, ANCHOR]);
        let parsed = FormPageParser::new().extract(&html).unwrap();
        assert_eq!(
            parsed,
            Confirmation::AwaitingToken {
                download_url: "https://drive.usercontent.google.com/download?id=ID&export=EXPORT&confirm=CONFIRM&uuid=UUID".to_string(),
                extension: ".gz".to_string(),
            }
        );
    }

    // The five required fields must all be present; every proper non-empty
    // subset of them yields no confirmation.
    #[test]
    fn test_all_proper_subsets_of_required_fields_yield_none() {
        let required = [ACTION, ID, EXPORT, CONFIRM, UUID];
        let parser = FormPageParser::new();

        for mask in 1u32..31 {
            let parts: Vec<&str> = required
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, part)| *part)
                .collect();
            let html = page(&parts);
            assert!(
                parser.extract(&html).is_none(),
                "subset mask {mask:#07b} unexpectedly parsed"
            );
        }
    }

    #[test]
    fn test_empty_html_yields_none() {
        assert!(FormPageParser::new().extract("").is_none());
        assert!(FormPageParser::new().extract("<html></html>").is_none());
    }

    #[test]
    fn test_extension_defaults_to_zip_without_anchor() {
        let html = page(&[ACTION, ID, EXPORT, CONFIRM, UUID]);
        let parsed = FormPageParser::new().extract(&html).unwrap();
        match parsed {
            Confirmation::AwaitingToken { extension, .. } => assert_eq!(extension, ".zip"),
            Confirmation::Ready { .. } => panic!("expected AwaitingToken"),
        }
    }

    #[test]
    fn test_binary_payload_does_not_parse() {
        // A PDF body must be treated as content, not an interstitial.
        let body = "%PDF-1.4 binary stream follows";
        assert!(FormPageParser::new().extract(body).is_none());
    }
}

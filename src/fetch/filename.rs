//! Filename inference for downloaded payloads.
//!
//! The main flow infers the final filename from the endpoint's
//! `Content-Disposition` response header; the secondary sub-flow only has a
//! display name scraped from the interstitial to work with, so it infers an
//! extension from that instead.

use std::sync::LazyLock;

use regex::Regex;

/// Name used when no Content-Disposition filename can be inferred.
pub const DEFAULT_FILENAME: &str = "downloaded_file";

/// Extension used when the interstitial carries no recognizable display name.
pub const DEFAULT_EXTENSION: &str = ".zip";

#[allow(clippy::expect_used)]
static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename="([^"]+)""#).expect("filename regex is valid")
});

/// Extracts a filename from a Content-Disposition header value.
///
/// Handles both:
/// - `attachment; filename*=UTF-8''example.pdf` (RFC 5987, tried first)
/// - `attachment; filename="example.pdf"`
#[must_use]
pub fn parse_content_disposition(header: &str) -> Option<String> {
    // RFC 5987 encoded form: charset'language'percent-encoded-value
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                return Some(decoded.into_owned());
            }
        }
    }

    FILENAME_PATTERN
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Infers the final filename from a Content-Disposition header, falling back
/// to [`DEFAULT_FILENAME`] when the header is absent or unparseable.
#[must_use]
pub fn infer_filename(content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(parse_content_disposition)
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Infers a file extension (with leading dot) from a display name, falling
/// back to [`DEFAULT_EXTENSION`].
///
/// A trailing dot or a dot-less name yields the fallback.
#[must_use]
pub fn extension_from_display_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return DEFAULT_EXTENSION.to_string();
    };
    let trimmed = name.trim();
    match trimmed.rfind('.') {
        Some(pos) if pos + 1 < trimmed.len() => trimmed[pos..].to_string(),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_filename() {
        assert_eq!(
            parse_content_disposition(r#"attachment; filename="report.pdf""#),
            Some("report.pdf".to_string())
        );
    }

    #[test]
    fn test_rfc5987_filename() {
        assert_eq!(
            parse_content_disposition("attachment; filename*=UTF-8''na%C3%AFve.pdf"),
            Some("na\u{ef}ve.pdf".to_string())
        );
    }

    #[test]
    fn test_no_filename_field() {
        assert_eq!(parse_content_disposition("inline"), None);
    }

    #[test]
    fn test_infer_filename_with_header() {
        let name = infer_filename(Some(r#"attachment; filename="report.pdf""#));
        assert_eq!(name, "report.pdf");
    }

    #[test]
    fn test_infer_filename_defaults_without_header() {
        assert_eq!(infer_filename(None), "downloaded_file");
    }

    #[test]
    fn test_infer_filename_defaults_on_garbage_header() {
        assert_eq!(infer_filename(Some("attachment")), "downloaded_file");
    }

    #[test]
    fn test_extension_from_display_name() {
        assert_eq!(extension_from_display_name(Some("backup.tar.gz")), ".gz");
        assert_eq!(extension_from_display_name(Some("photo.png")), ".png");
    }

    #[test]
    fn test_extension_defaults() {
        assert_eq!(extension_from_display_name(None), ".zip");
        assert_eq!(extension_from_display_name(Some("no-extension")), ".zip");
        assert_eq!(extension_from_display_name(Some("trailing.")), ".zip");
    }
}

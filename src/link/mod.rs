//! Share-link validation and file identifier extraction.
//!
//! A Google Drive sharing link carries the file identifier either as an
//! `id=` query parameter or as a `/d/<id>/` path segment. This module
//! validates the link, extracts the identifier, and builds the content
//! endpoint the confirmation flow starts from. Pure string parsing, no I/O.

mod error;

pub use error::LinkError;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Host marker every recognized sharing link must contain (case-insensitive).
const HOST_MARKER: &str = "drive.google";

/// Production base URL for the content endpoint.
pub const DEFAULT_BASE_URL: &str = "https://drive.usercontent.google.com/u/0";

/// Matches the file identifier in either link form:
/// `...?id=<token>` or `.../d/<token>/`. The token is a maximal run of
/// characters excluding `&` and `/`.
#[allow(clippy::expect_used)]
static FILE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:id=|/d/)([^&/]+)").expect("file id regex is valid")
});

/// The extracted identifier naming a file within the sharing host's namespace.
///
/// Immutable once extracted; derived from a validated share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileId(String);

impl FileId {
    /// Validates a share link and extracts the file identifier.
    ///
    /// # Errors
    ///
    /// - [`LinkError::InvalidLink`] if the link does not contain the
    ///   `drive.google` host marker (case-insensitive).
    /// - [`LinkError::IdentifierNotFound`] if neither `id=<token>` nor
    ///   `/d/<token>/` yields an identifier.
    pub fn from_share_link(link: &str) -> Result<Self, LinkError> {
        if !link.to_lowercase().contains(HOST_MARKER) {
            return Err(LinkError::invalid_link(link));
        }

        let id = FILE_ID_PATTERN
            .captures(link)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| LinkError::identifier_not_found(link))?;

        debug!(id = %id, "extracted file identifier");
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the content endpoint for a file identifier.
///
/// The base URL is injectable so integration tests can point the engine at a
/// local mock server; production callers use [`DEFAULT_BASE_URL`].
#[must_use]
pub fn content_endpoint(base_url: &str, id: &FileId) -> String {
    format!(
        "{}/uc?id={}&authuser=0&export=download",
        base_url.trim_end_matches('/'),
        id
    )
}

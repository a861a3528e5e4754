//! Error types for share-link parsing.

use thiserror::Error;

/// Errors produced while validating a share link and extracting its
/// file identifier.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The input does not contain the recognized sharing-host marker.
    #[error("invalid share link (no recognized host): {link}")]
    InvalidLink {
        /// The offending input.
        link: String,
    },

    /// The link matched the host but carried no extractable identifier.
    #[error("no file identifier found in link: {link}")]
    IdentifierNotFound {
        /// The offending input.
        link: String,
    },
}

impl LinkError {
    /// Creates an invalid-link error.
    pub fn invalid_link(link: impl Into<String>) -> Self {
        Self::InvalidLink { link: link.into() }
    }

    /// Creates an identifier-not-found error.
    pub fn identifier_not_found(link: impl Into<String>) -> Self {
        Self::IdentifierNotFound { link: link.into() }
    }
}

//! Error types for the confirmation flow.

use thiserror::Error;

use crate::link::LinkError;
use crate::storage::StoreError;

/// Errors surfaced by [`FetchEngine::download`](super::FetchEngine::download).
///
/// Transport failures inside the main retry loop are not surfaced directly;
/// they are converted into retries until the attempt budget is exhausted, at
/// which point they become [`FetchError::RetriesExhausted`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The share link failed validation or carried no identifier.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// The retry budget ran out without a usable response body.
    #[error("failed to download file after {attempts} attempts")]
    RetriesExhausted {
        /// Total attempts made.
        attempts: u32,
    },

    /// Writing the payload to storage failed.
    #[error("failed to save file to storage: {source}")]
    Persistence {
        /// The underlying storage error.
        #[source]
        source: StoreError,
    },

    /// The secondary token sub-flow reported a failure.
    ///
    /// The sub-flow itself swallows errors into a result value; this variant
    /// exists so the top-level download never reports success with an
    /// unwritten path.
    #[error("secondary fetch failed: {reason}")]
    Secondary {
        /// Human-readable failure reason from the sub-flow.
        reason: String,
    },
}

impl FetchError {
    /// Creates an exhausted-retries error.
    #[must_use]
    pub fn retries_exhausted(attempts: u32) -> Self {
        Self::RetriesExhausted { attempts }
    }

    /// Creates a persistence error.
    #[must_use]
    pub fn persistence(source: StoreError) -> Self {
        Self::Persistence { source }
    }

    /// Creates a secondary-flow error.
    pub fn secondary(reason: impl Into<String>) -> Self {
        Self::Secondary {
            reason: reason.into(),
        }
    }
}

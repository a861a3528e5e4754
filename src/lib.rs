//! Drive-Fetch Library
//!
//! Retrieves files behind Google Drive sharing links by emulating the
//! browser-facing HTML confirmation flow, then persists the bytes locally.
//!
//! # Architecture
//!
//! - [`link`] - share-link validation and file identifier extraction
//! - [`fetch`] - confirmation flow engine, transport seam, interstitial parsing
//! - [`storage`] - persistence seam with a filesystem implementation
//! - [`format_human_size`] - display helper for byte counts
//!
//! The engine consumes its collaborators ([`Transport`], [`Store`]) through
//! traits, so the whole negotiation is testable against doubles without a
//! network or a writable disk.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fetch;
pub mod format;
pub mod link;
pub mod storage;

// Re-export commonly used types
pub use fetch::{
    Confirmation, DEFAULT_MAX_RETRIES, DownloadOutcome, FetchEngine, FetchError, FormPageParser,
    HttpTransport, InterstitialParser, RetryPolicy, SecondaryOutcome, Transport, TransportError,
};
pub use format::format_human_size;
pub use link::{FileId, LinkError, content_endpoint};
pub use storage::{FsStore, Store, StoreError};

//! Download negotiation: the confirmation flow engine and its seams.
//!
//! # Architecture
//!
//! - [`FetchEngine`] - state machine driving the HTTP exchanges
//! - [`Transport`] / [`HttpTransport`] - HTTP seam (GET + header resolution)
//! - [`InterstitialParser`] / [`FormPageParser`] - confirmation-page scraping
//! - [`RetryPolicy`] - bounded attempt budget for the main fetch loop
//! - [`FetchError`] - structured errors surfaced to callers

mod engine;
mod error;
mod filename;
mod interstitial;
mod retry;
mod transport;

pub use engine::{Clock, DownloadOutcome, FetchEngine, SecondaryOutcome, SystemClock};
pub use error::FetchError;
pub use filename::{DEFAULT_EXTENSION, DEFAULT_FILENAME, infer_filename, parse_content_disposition};
pub use interstitial::{Confirmation, FormPageParser, InterstitialParser};
pub use retry::{DEFAULT_MAX_RETRIES, RetryDecision, RetryPolicy};
pub use transport::{HttpTransport, Transport, TransportError};

//! Confirmation flow engine.
//!
//! Drives the sequence of HTTP exchanges that turns a share link into a
//! persisted file: resolve the identifier, fetch the content endpoint under
//! a bounded retry budget, detect whether the response is the payload or an
//! HTML interstitial, optionally run the secondary token sub-flow, and hand
//! the final bytes to the injected [`Store`].
//!
//! The engine holds no mutable state across invocations; concurrent
//! downloads are naturally independent. Each invocation is strictly
//! sequential: one transport call at a time, no internal concurrency.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use drive_fetch::{FetchEngine, FsStore, HttpTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = FetchEngine::new(
//!     Arc::new(HttpTransport::new()),
//!     Arc::new(FsStore::new("./downloads")),
//! );
//! let outcome = engine
//!     .download("https://drive.google.com/file/d/ABC123/view")
//!     .await?;
//! println!("saved {} to {}", outcome.name, outcome.path.display());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::error::FetchError;
use super::filename::infer_filename;
use super::interstitial::{Confirmation, FormPageParser, InterstitialParser};
use super::retry::{RetryDecision, RetryPolicy};
use super::transport::Transport;
use crate::link::{DEFAULT_BASE_URL, FileId, content_endpoint};
use crate::storage::Store;

/// Human message reported when the secondary sub-flow saves a payload.
const SECONDARY_SAVED_MESSAGE: &str = "File downloaded and saved successfully.";

/// Time source for synthesized filenames in the secondary sub-flow.
///
/// Injected so the flow stays deterministically testable instead of reading
/// ambient process time.
pub trait Clock: Send + Sync {
    /// Returns seconds since the Unix epoch.
    fn unix_timestamp(&self) -> u64;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Terminal result of a successful download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    /// The confirmation URL resolved from an interstitial, when one was
    /// detected. `None` means the endpoint served the payload directly.
    pub download_url: Option<String>,
    /// Final filename the payload was stored under.
    pub name: String,
    /// Storage location of the payload.
    pub path: PathBuf,
}

/// Result of the secondary token sub-flow.
///
/// This sub-flow deliberately swallows its failures into a value rather
/// than propagating them; callers inspect the variant instead of matching
/// on `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SecondaryOutcome {
    /// The payload was fetched and persisted.
    Saved {
        /// Human-readable success message.
        message: String,
        /// The synthesized filename.
        name: String,
        /// Storage location of the payload.
        path: PathBuf,
    },

    /// Fetching or persisting failed.
    Failed {
        /// Human-readable failure reason.
        error: String,
    },
}

/// The download negotiation state machine.
///
/// Collaborators are injected: the [`Transport`] performs HTTP exchanges,
/// the [`Store`] persists bytes, [`InterstitialParser`]s recognize
/// confirmation pages, and the [`Clock`] feeds synthesized filenames.
pub struct FetchEngine {
    transport: Arc<dyn Transport>,
    store: Arc<dyn Store>,
    parsers: Vec<Box<dyn InterstitialParser>>,
    clock: Arc<dyn Clock>,
    retry_policy: RetryPolicy,
    base_url: String,
}

impl std::fmt::Debug for FetchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchEngine")
            .field("base_url", &self.base_url)
            .field("max_attempts", &self.retry_policy.max_attempts())
            .field("parsers", &self.parsers.len())
            .finish_non_exhaustive()
    }
}

impl FetchEngine {
    /// Creates an engine with the default retry policy, production base URL,
    /// system clock, and the form-page interstitial parser.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn Store>) -> Self {
        Self {
            transport,
            store,
            parsers: vec![Box::new(FormPageParser::new())],
            clock: Arc::new(SystemClock),
            retry_policy: RetryPolicy::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the retry policy for the main fetch loop.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Overrides the content-endpoint base URL (used by integration tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the clock used for synthesized filenames.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Registers an additional interstitial parser variant.
    ///
    /// Parsers are tried in registration order; the first match wins.
    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn InterstitialParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Downloads the file behind a share link and persists it.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Link`] if the link fails validation (no network call
    ///   is made in that case).
    /// - [`FetchError::RetriesExhausted`] if the attempt budget runs out
    ///   without a usable response body.
    /// - [`FetchError::Persistence`] if the final storage write fails.
    /// - [`FetchError::Secondary`] if the token sub-flow reports a failure.
    #[instrument(skip(self), fields(link = %link, max_attempts = self.retry_policy.max_attempts()))]
    pub async fn download(&self, link: &str) -> Result<DownloadOutcome, FetchError> {
        let id = FileId::from_share_link(link)?;
        let endpoint = content_endpoint(&self.base_url, &id);
        debug!(endpoint = %endpoint, "content endpoint built");

        let (body, confirmation) = self.fetch_candidate_payload(&endpoint).await?;

        match confirmation {
            Some(Confirmation::AwaitingToken {
                download_url,
                extension,
            }) => {
                // The at token is missing; only the secondary round-trip
                // yields the true payload.
                info!(url = %download_url, "interstitial requires token sub-flow");
                match self
                    .fetch_with_synthesized_name(&download_url, &extension)
                    .await
                {
                    SecondaryOutcome::Saved { name, path, .. } => Ok(DownloadOutcome {
                        download_url: Some(download_url),
                        name,
                        path,
                    }),
                    SecondaryOutcome::Failed { error } => Err(FetchError::secondary(error)),
                }
            }
            confirmation => {
                // Either no interstitial was detected (the candidate body is
                // the payload) or the confirmation URL was complete.
                let download_url = confirmation.map(|c| c.download_url().to_string());
                let name = self.infer_name(&endpoint).await;
                let path = self
                    .store
                    .store(&name, &body)
                    .await
                    .map_err(FetchError::persistence)?;

                info!(name = %name, path = %path.display(), "download complete");
                Ok(DownloadOutcome {
                    download_url,
                    name,
                    path,
                })
            }
        }
    }

    /// Fetches the endpoint under the retry budget until a non-empty body is
    /// obtained, then attempts interstitial parsing on it.
    ///
    /// Retries exist only to overcome transport-level failures and empty
    /// bodies; the loop exits on any non-empty body regardless of the parse
    /// outcome.
    async fn fetch_candidate_payload(
        &self,
        endpoint: &str,
    ) -> Result<(Vec<u8>, Option<Confirmation>), FetchError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "fetching content endpoint");

            match self.transport.http_get(endpoint).await {
                Ok(body) if !body.is_empty() => {
                    let confirmation = self.parse_interstitial(&body);
                    return Ok((body, confirmation));
                }
                Ok(_) => warn!(attempt, "empty response body"),
                Err(e) => warn!(attempt, error = %e, "transport failure"),
            }

            match self.retry_policy.next_attempt(attempt) {
                RetryDecision::Retry { delay, attempt } => {
                    debug!(next_attempt = attempt, delay_ms = delay.as_millis(), "retrying");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                RetryDecision::Exhausted { attempts } => {
                    return Err(FetchError::retries_exhausted(attempts));
                }
            }
        }
    }

    /// Runs the registered parsers over the candidate body, first match wins.
    fn parse_interstitial(&self, body: &[u8]) -> Option<Confirmation> {
        let html = String::from_utf8_lossy(body);
        self.parsers.iter().find_map(|parser| {
            let parsed = parser.extract(&html);
            if parsed.is_some() {
                debug!(parser = parser.name(), "interstitial recognized");
            }
            parsed
        })
    }

    /// Infers the final filename from the endpoint's response headers.
    ///
    /// A failed header fetch degrades to the default name; the payload is
    /// already in hand at this point.
    async fn infer_name(&self, endpoint: &str) -> String {
        match self.transport.get_headers(endpoint).await {
            Ok(headers) => infer_filename(headers.get("content-disposition").map(String::as_str)),
            Err(e) => {
                warn!(error = %e, "header fetch failed; using default filename");
                infer_filename(None)
            }
        }
    }

    /// Fetches a payload through a partial confirmation URL and persists it
    /// under a timestamp-synthesized name.
    ///
    /// Single attempt, no retry budget. Failures are swallowed into
    /// [`SecondaryOutcome::Failed`] rather than propagated; inspect the
    /// returned variant.
    #[instrument(skip(self), fields(url = %partial_download_url))]
    pub async fn fetch_with_synthesized_name(
        &self,
        partial_download_url: &str,
        extension: &str,
    ) -> SecondaryOutcome {
        let body = match self.transport.http_get(partial_download_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "secondary fetch failed");
                return SecondaryOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let name = format!(
            "downloaded_file_{}{}",
            self.clock.unix_timestamp(),
            extension
        );

        match self.store.store(&name, &body).await {
            Ok(path) => {
                info!(name = %name, path = %path.display(), "secondary fetch saved");
                SecondaryOutcome::Saved {
                    message: SECONDARY_SAVED_MESSAGE.to_string(),
                    name,
                    path,
                }
            }
            Err(e) => {
                warn!(error = %e, "secondary persistence failed");
                SecondaryOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.unix_timestamp() > 1_577_836_800);
    }

    #[test]
    fn test_outcome_serializes_to_json() {
        let outcome = DownloadOutcome {
            download_url: None,
            name: "report.pdf".to_string(),
            path: PathBuf::from("/tmp/report.pdf"),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["download_url"], serde_json::Value::Null);
        assert_eq!(json["name"], "report.pdf");
    }

    #[test]
    fn test_secondary_outcome_tagged_serialization() {
        let outcome = SecondaryOutcome::Failed {
            error: "disk full".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "disk full");
    }
}

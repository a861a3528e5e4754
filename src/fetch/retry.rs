//! Bounded retry policy for the main fetch loop.
//!
//! The confirmation flow retries exactly one thing: the initial content
//! request, when the transport fails outright or hands back an empty body.
//! Every such failure is retryable by contract, so the policy is a plain
//! attempt budget with exponential backoff and jitter between attempts.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// Default maximum attempts (including the initial attempt).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for the first retry.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Default maximum delay cap.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(8);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays.
const MAX_JITTER: Duration = Duration::from_millis(250);

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed).
        attempt: u32,
    },

    /// Budget exhausted; do not retry.
    Exhausted {
        /// Total attempts made.
        attempts: u32,
    },
}

/// Attempt budget with exponential backoff.
///
/// Delay formula: `min(base_delay * multiplier^(attempt-1), max_delay) + jitter`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with custom settings.
    ///
    /// `max_attempts` includes the initial attempt and is clamped to >= 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom attempt budget and default backoff.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Creates a policy with no delay between attempts (used by tests).
    #[must_use]
    pub fn without_backoff(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Returns the configured attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides whether to retry after a failed attempt.
    ///
    /// `attempt` is the attempt number that just failed (1-indexed).
    #[must_use]
    pub fn next_attempt(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "attempt budget exhausted");
            return RetryDecision::Exhausted { attempts: attempt };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );
        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * f64::from(self.backoff_multiplier).powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + self.calculate_jitter()
    }

    /// Random jitter between 0 and [`MAX_JITTER`] to avoid synchronized
    /// retries when several invocations fail at once.
    fn calculate_jitter(&self) -> Duration {
        let mut rng = rand::thread_rng();
        let jitter_ms = rng.gen_range(0..=MAX_JITTER.as_millis() as u64);
        Duration::from_millis(jitter_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget_is_three() {
        assert_eq!(RetryPolicy::default().max_attempts(), DEFAULT_MAX_RETRIES);
        assert_eq!(DEFAULT_MAX_RETRIES, 3);
    }

    #[test]
    fn test_budget_minimum_is_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts(), 1);
    }

    #[test]
    fn test_retries_until_budget_exhausted() {
        let policy = RetryPolicy::with_max_attempts(3);

        assert!(matches!(
            policy.next_attempt(1),
            RetryDecision::Retry { attempt: 2, .. }
        ));
        assert!(matches!(
            policy.next_attempt(2),
            RetryDecision::Retry { attempt: 3, .. }
        ));
        assert_eq!(
            policy.next_attempt(3),
            RetryDecision::Exhausted { attempts: 3 }
        );
    }

    #[test]
    fn test_delay_grows_with_attempts() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(32), 2.0);

        // attempt 1 -> ~1s, attempt 3 -> ~4s (plus up to 250ms jitter each)
        let first = policy.calculate_delay(1);
        let third = policy.calculate_delay(3);
        assert!(first >= Duration::from_secs(1));
        assert!(first <= Duration::from_millis(1250));
        assert!(third >= Duration::from_secs(4));
        assert!(third <= Duration::from_millis(4250));
    }

    #[test]
    fn test_delay_respects_cap() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(2), 2.0);
        let delay = policy.calculate_delay(6);
        assert!(delay <= Duration::from_millis(2250));
    }

    #[test]
    fn test_without_backoff_has_zero_delay() {
        let policy = RetryPolicy::without_backoff(3);
        match policy.next_attempt(1) {
            RetryDecision::Retry { delay, .. } => assert_eq!(delay, Duration::ZERO),
            RetryDecision::Exhausted { .. } => panic!("expected retry"),
        }
    }

    #[test]
    fn test_jitter_within_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            assert!(policy.calculate_jitter() <= MAX_JITTER);
        }
    }
}

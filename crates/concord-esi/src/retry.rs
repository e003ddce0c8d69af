//! Bounded retry with exponential backoff for remote calls.
//!
//! Transient failures (rate limiting, server errors, transport hiccups) are
//! recovered locally; the caller only sees an error once the attempt budget
//! is exhausted or the error is permanent. No sleep happens after the final
//! failed attempt.

use std::time::Duration;

use concord_config::RetrySettings;
use tracing::warn;

use crate::error::EsiError;

/// Backoff parameters for one class of remote calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first re-attempt.
    pub base_delay: Duration,
    /// Factor applied to the delay after each retry.
    pub multiplier: u32,
}

impl RetryPolicy {
    /// Delay before re-attempt number `retry` (1-based), so retry 1 sleeps
    /// `base_delay`, retry 2 sleeps `base_delay * multiplier`, and so on.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.base_delay * self.multiplier.saturating_pow(retry.saturating_sub(1))
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
            multiplier: settings.multiplier,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

/// Run `op` with bounded retries.
///
/// Retries only errors for which [`EsiError::is_retryable`] holds; permanent
/// errors propagate immediately. The final error, transient or not, is
/// returned unchanged.
///
/// # Errors
///
/// The error of the last attempt.
pub async fn retry_call<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, EsiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EsiError>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_for_retry(attempt);
                warn!(
                    call = label,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient ESI error, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                if err.is_retryable() {
                    warn!(
                        call = label,
                        attempts = attempt,
                        error = %err,
                        "ESI call failed after exhausting retries"
                    );
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
        }
    }

    fn server_error() -> EsiError {
        EsiError::Api {
            status: 503,
            message: "try later".into(),
        }
    }

    #[test]
    fn delays_double_per_retry() {
        let policy = policy();
        assert_eq!(policy.delay_for_retry(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_retry(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_retry(3), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_after_two_backoffs() {
        let attempts = Cell::new(0u32);
        let start = Instant::now();

        let result = retry_call(policy(), "fetch_contacts", || {
            attempts.set(attempts.get() + 1);
            let n = attempts.get();
            async move {
                if n < 3 {
                    Err(server_error())
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(attempts.get(), 3);
        // slept 1s then 2s of virtual time, nothing more
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_propagates_without_a_final_sleep() {
        let attempts = Cell::new(0u32);
        let start = Instant::now();

        let err = retry_call(policy(), "fetch_contacts", || {
            attempts.set(attempts.get() + 1);
            async {
                Err::<(), _>(EsiError::Api {
                    status: 429,
                    message: "rate limited".into(),
                })
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, EsiError::Api { status: 429, .. }));
        assert_eq!(attempts.get(), 3);
        // two sleeps only: 1s + 2s, none after the final failure
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_error_propagates_immediately() {
        let attempts = Cell::new(0u32);
        let start = Instant::now();

        let err = retry_call(policy(), "fetch_contacts", || {
            attempts.set(attempts.get() + 1);
            async {
                Err::<(), _>(EsiError::Api {
                    status: 404,
                    message: "no such character".into(),
                })
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, EsiError::Api { status: 404, .. }));
        assert_eq!(attempts.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_needs_no_sleep() {
        let start = Instant::now();
        let result = retry_call(policy(), "fetch_labels", || async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(result, 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

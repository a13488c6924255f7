/// Shared retry/backoff policy for HTTP-backed adapters (embeddings,
/// reranker): capped exponential backoff, retried only on 429/5xx and
/// transient transport failures (§4.8, §7).
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_secs(4),
            max_attempts: 4,
        }
    }
}

impl RetryPolicy {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let scale = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
        let millis = (self.base_delay.as_millis() as u64).saturating_mul(scale);
        Duration::from_millis(millis).min(self.max_delay)
    }
}

/// Outcome an attempt reports back to the retry loop.
pub enum Attempt<T> {
    Success(T),
    Retryable(crate::error::BeaconError),
    Fatal(crate::error::BeaconError),
}

/// Runs `op` up to `policy.max_attempts` times, sleeping with capped
/// exponential backoff between retryable failures. The last error is
/// surfaced once attempts are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(policy: RetryPolicy, mut op: F) -> crate::Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let mut last_err = None;
    for attempt in 1..=policy.max_attempts {
        match op(attempt).await {
            Attempt::Success(value) => return Ok(value),
            Attempt::Fatal(err) => return Err(err),
            Attempt::Retryable(err) => {
                last_err = Some(err);
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| crate::error::BeaconError::internal("retry loop exhausted with no recorded error")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_then_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(300));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(600));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(1200));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_attempts: 3,
        };
        let mut calls = 0;
        let result = retry_with_backoff(policy, |attempt| {
            calls += 1;
            async move {
                if attempt < 2 {
                    Attempt::Retryable(crate::error::BeaconError::internal("transient"))
                } else {
                    Attempt::Success(attempt)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 2);
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn fatal_errors_do_not_retry() {
        let policy = RetryPolicy::default();
        let mut calls = 0;
        let result: crate::Result<()> = retry_with_backoff(policy, |_| {
            calls += 1;
            async { Attempt::Fatal(crate::error::BeaconError::invalid_request("bad request")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}

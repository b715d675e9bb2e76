use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::ports::CompletionError;

/// Timeout, retry and backoff parameters shared by every completion backend.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Deadline for a single attempt.
    pub timeout: Duration,
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Delay before retry k (0-indexed) is `base_delay * 2^k`. No jitter.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(12_000),
            max_retries: 2,
            base_delay: Duration::from_millis(1_000),
        }
    }
}

impl RetryPolicy {
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry)
    }
}

/// Drive `attempt` under the policy: bound each attempt by the timeout,
/// retry only transient failures (timeout / HTTP 5xx) with exponential
/// backoff, and abort immediately when `cancel` triggers -- both mid-attempt
/// and mid-backoff. Cancellation is never retried.
///
/// An explicit loop rather than recursion keeps the attempt counter and the
/// cancellation check points visible.
pub async fn run_with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut attempt: F,
) -> Result<T, CompletionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CompletionError>>,
{
    let mut retry = 0u32;
    loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(CompletionError::Cancelled),
            result = tokio::time::timeout(policy.timeout, attempt()) => match result {
                Ok(result) => result,
                Err(_) => Err(CompletionError::Timeout(policy.timeout.as_millis() as u64)),
            },
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retry < policy.max_retries => {
                let delay = policy.backoff_delay(retry);
                tracing::warn!(
                    error = %e,
                    retry = retry + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Transient completion failure, backing off"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Err(CompletionError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                retry += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

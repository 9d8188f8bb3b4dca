use std::future::Future;
use std::time::Duration;

use crate::error::V0Error;

/// Delay before the next attempt: linear, attempt × step.
pub fn backoff_delay(step: Duration, attempt: u32) -> Duration {
    step.saturating_mul(attempt)
}

/// Runs `op` up to `max_attempts` times (at least once).
///
/// Only errors for which [`V0Error::is_retryable`] holds trigger another
/// attempt; anything else is returned immediately. After the last attempt the
/// final error is returned as-is.
pub async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    step: Duration,
    mut op: F,
) -> Result<T, V0Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, V0Error>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() || attempt >= max_attempts => return Err(e),
            Err(e) => {
                let delay = backoff_delay(step, attempt);
                tracing::warn!(attempt, max_attempts, ?delay, "v0 request failed, retrying: {e}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

//! Retry with exponential back-off and jitter for upstream calls.
//!
//! Only transient failures (network errors, timeouts, 429 and 5xx) are
//! retried. Anything else is returned on the first attempt so callers can
//! classify it without waiting.

use std::future::Future;
use std::time::Duration;

use crate::error::PhantomBusterError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &PhantomBusterError) -> bool {
    match err {
        PhantomBusterError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PhantomBusterError::Status { status, .. } => *status == 429 || *status >= 500,
        PhantomBusterError::Deserialize { .. } | PhantomBusterError::InvalidConfig(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The delay before retry `n` is `backoff_base_ms × 2ⁿ⁻¹` with ±25 % jitter,
/// capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PhantomBusterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PhantomBusterError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "PhantomBuster transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

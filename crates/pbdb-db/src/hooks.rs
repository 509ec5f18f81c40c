//! Pre/post tracing around store operations.
//!
//! Every public store function routes its body through [`instrumented`], so
//! each operation logs a `debug` event before it runs and one after it
//! finishes (with elapsed time and outcome). Failures log at `warn`.

use std::future::Future;
use std::time::Instant;

use crate::DbError;

pub(crate) async fn instrumented<T, F>(op: &'static str, fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    tracing::debug!(op, "store operation starting");
    let started = Instant::now();
    let result = fut.await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match &result {
        Ok(_) => tracing::debug!(op, elapsed_ms, "store operation finished"),
        Err(e) => tracing::warn!(op, elapsed_ms, error = %e, "store operation failed"),
    }
    result
}

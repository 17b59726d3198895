use crate::errors::StoreError;
use std::future::Future;
use std::time::Duration;

/// Run a store operation under a deadline.
///
/// When the deadline elapses the future is dropped. Dropping an open sqlx
/// transaction rolls it back before its connection is reused.
pub async fn with_deadline<T, F>(
    deadline: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, deadline_ms = deadline.as_millis() as u64, "store operation timed out");
            Err(StoreError::timed_out(operation))
        }
    }
}

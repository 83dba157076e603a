//! Deadlines for calls that leave the process.

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::result::AppResult;

/// Runs `fut` with a deadline.
///
/// An elapsed deadline becomes a retryable [`ErrorKind::Timeout`] error
/// naming `operation`. Dropping the returned future cancels `fut`.
///
/// [`ErrorKind::Timeout`]: crate::error::ErrorKind::Timeout
pub async fn with_deadline<T, F>(limit: Duration, operation: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation = %operation, limit_ms = limit.as_millis() as u64, "Operation timed out");
            Err(AppError::timeout(format!(
                "{operation} did not complete within {}ms",
                limit.as_millis()
            )))
        }
    }
}

use std::future::Future;
use std::time::Duration;

use ackwatch_core::{AckError, AckResult};

/// Run one platform call with an upper bound. No retry: a timeout is reported
/// like any other transient failure and the caller moves on.
pub async fn bounded<T, F>(limit: Duration, operation: &str, call: F) -> AckResult<T>
where
    F: Future<Output = AckResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AckError::Timeout {
            operation: operation.to_string(),
            after: limit,
        }),
    }
}

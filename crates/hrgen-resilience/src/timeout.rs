//! Timeout bounding for in-flight attempts.
//!
//! Every backend invocation runs under a bound so no attempt blocks
//! indefinitely. An exceeded bound unwinds as a `Timeout` error, which the
//! taxonomy classifies as retryable.

use hrgen_core::{GatewayError, GatewayResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run `operation` with a time bound.
///
/// # Errors
/// Returns the operation's own error, or [`GatewayError::Timeout`] if the
/// bound elapses first. The aborted attempt's partial work is dropped.
pub async fn bounded<F, T>(backend: &str, limit: Duration, operation: F) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!(backend = %backend, limit_ms = limit.as_millis() as u64, "attempt timed out");
            Err(GatewayError::timeout(backend, limit))
        }
    }
}

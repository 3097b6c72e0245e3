//! Generation outcome types.
//!
//! [`GenerationResult`] is created only on success; [`GenerationFailure`]
//! only when a terminal failure leaves the gateway. Both expose the attempt
//! count and elapsed time so callers can export structured telemetry.

use crate::backend::BackendKind;
use crate::error::{FailureKind, GatewayError};
use crate::types::RequestId;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Successful generation outcome.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// The generated text. Non-empty.
    pub text: String,
    /// Instance id of the backend that produced the text.
    pub backend_id: String,
    /// Which backend selector was used.
    pub backend: BackendKind,
    /// Wall-clock time across all attempts.
    pub duration: Duration,
    /// Number of backend invocations performed (>= 1).
    pub attempts: u32,
    /// The originating request id.
    pub request_id: RequestId,
}

impl GenerationResult {
    /// HTTP status a handler layer should answer with.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        200
    }
}

/// Terminal generation failure, produced after retries are exhausted or a
/// non-retryable error occurred.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationFailure {
    /// Classified failure kind.
    pub kind: FailureKind,
    /// Human-readable detail from the last error. Never discarded.
    pub message: String,
    /// Whether the kind is retryable (informational; the gateway has already
    /// stopped retrying).
    pub retryable: bool,
    /// Server-specified minimum wait before retrying, if the last error
    /// carried one.
    pub retry_after: Option<Duration>,
    /// Number of backend invocations performed.
    pub attempts: u32,
    /// Wall-clock time across all attempts.
    pub duration: Duration,
    /// Instance id of the backend that was attempted.
    pub backend_id: String,
    /// The originating request id.
    pub request_id: RequestId,
}

impl GenerationFailure {
    /// Build a failure from the last error of an attempt sequence.
    #[must_use]
    pub fn from_error(
        error: &GatewayError,
        request_id: RequestId,
        backend_id: impl Into<String>,
        attempts: u32,
        duration: Duration,
    ) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            retryable: error.is_retryable(),
            retry_after: error.retry_after(),
            attempts,
            duration,
            backend_id: backend_id.into(),
            request_id,
        }
    }

    /// HTTP status a handler layer should map this failure to.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} attempt(s): {}",
            self.kind, self.attempts, self.message
        )
    }
}

impl std::error::Error for GenerationFailure {}

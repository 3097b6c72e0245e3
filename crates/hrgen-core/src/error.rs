//! Error types and the failure taxonomy.
//!
//! Every failure crossing the gateway boundary is classified into a
//! [`FailureKind`]. The kind decides whether a retry may help and which HTTP
//! status a handler layer should answer with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Result alias used throughout the gateway crates.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// The fixed failure taxonomy.
///
/// The set is closed: every error the gateway returns maps to exactly one
/// kind, and every kind maps to exactly one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Backend unreachable (connection refused, DNS failure, 5xx).
    ConnectionUnavailable,
    /// Attempt or deadline bound exceeded.
    Timeout,
    /// Backend signalled throttling; may carry a retry-after hint.
    RateLimited,
    /// Credentials rejected by the backend.
    AuthInvalid,
    /// Backend returned unparseable or empty content.
    MalformedResponse,
    /// Backend signalled that the output was cut off.
    Truncated,
    /// Uncategorized failure, surfaced with full detail.
    Unknown,
}

impl FailureKind {
    /// Whether re-attempting the same request may succeed.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::ConnectionUnavailable | Self::Timeout | Self::RateLimited
        )
    }

    /// The HTTP status a handler layer should map this kind to.
    ///
    /// The mapping is total: every kind has exactly one status.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::ConnectionUnavailable => 503,
            Self::Timeout => 504,
            Self::RateLimited => 429,
            Self::AuthInvalid => 401,
            Self::MalformedResponse | Self::Truncated => 502,
            Self::Unknown => 500,
        }
    }

    /// Stable string form used in telemetry fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionUnavailable => "connection_unavailable",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::AuthInvalid => "auth_invalid",
            Self::MalformedResponse => "malformed_response",
            Self::Truncated => "truncated",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type shared by all gateway crates.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Backend unreachable.
    #[error("backend '{backend}' unavailable: {message}")]
    ConnectionUnavailable {
        /// Backend instance id.
        backend: String,
        /// Transport-level detail.
        message: String,
    },

    /// Attempt exceeded its time bound.
    #[error("backend '{backend}' timed out after {limit:?}")]
    Timeout {
        /// Backend instance id.
        backend: String,
        /// The bound that was exceeded.
        limit: Duration,
    },

    /// Backend signalled throttling.
    #[error("backend '{backend}' rate limited: {message}")]
    RateLimited {
        /// Backend instance id.
        backend: String,
        /// Server-specified minimum wait before retrying, if given.
        retry_after: Option<Duration>,
        /// Backend-provided detail.
        message: String,
    },

    /// Credentials rejected.
    #[error("backend '{backend}' rejected credentials: {message}")]
    AuthInvalid {
        /// Backend instance id.
        backend: String,
        /// Backend-provided detail.
        message: String,
    },

    /// Unparseable or empty backend response.
    #[error("backend '{backend}' returned a malformed response: {message}")]
    MalformedResponse {
        /// Backend instance id.
        backend: String,
        /// What was wrong with the payload.
        message: String,
    },

    /// Backend signalled that output was cut off.
    #[error("backend '{backend}' truncated the output ({reason})")]
    Truncated {
        /// Backend instance id.
        backend: String,
        /// The backend's stop signal, e.g. `length`.
        reason: String,
    },

    /// Caller-supplied input failed validation.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Invalid configuration detected while constructing a component.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is misconfigured.
        message: String,
    },

    /// Uncategorized failure.
    #[error("backend '{backend}' failed: {message}")]
    Unknown {
        /// Backend instance id.
        backend: String,
        /// Full detail for diagnosis.
        message: String,
    },
}

impl GatewayError {
    /// Classify this error into the failure taxonomy.
    ///
    /// `Validation` and `Configuration` never occur inside the attempt loop;
    /// at the submit boundary they surface as `Unknown`.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ConnectionUnavailable { .. } => FailureKind::ConnectionUnavailable,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::AuthInvalid { .. } => FailureKind::AuthInvalid,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
            Self::Truncated { .. } => FailureKind::Truncated,
            Self::Validation { .. } | Self::Configuration { .. } | Self::Unknown { .. } => {
                FailureKind::Unknown
            }
        }
    }

    /// Whether a retry of the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Server-specified minimum wait before retrying, if any.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// The backend this error originated from, if any.
    #[must_use]
    pub fn backend(&self) -> Option<&str> {
        match self {
            Self::ConnectionUnavailable { backend, .. }
            | Self::Timeout { backend, .. }
            | Self::RateLimited { backend, .. }
            | Self::AuthInvalid { backend, .. }
            | Self::MalformedResponse { backend, .. }
            | Self::Truncated { backend, .. }
            | Self::Unknown { backend, .. } => Some(backend),
            Self::Validation { .. } | Self::Configuration { .. } => None,
        }
    }

    /// Backend unreachable.
    pub fn connection_unavailable(
        backend: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ConnectionUnavailable {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Attempt exceeded its time bound.
    pub fn timeout(backend: impl Into<String>, limit: Duration) -> Self {
        Self::Timeout {
            backend: backend.into(),
            limit,
        }
    }

    /// Backend signalled throttling.
    pub fn rate_limited(
        backend: impl Into<String>,
        retry_after: Option<Duration>,
        message: impl Into<String>,
    ) -> Self {
        Self::RateLimited {
            backend: backend.into(),
            retry_after,
            message: message.into(),
        }
    }

    /// Credentials rejected.
    pub fn auth_invalid(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AuthInvalid {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Unparseable or empty backend response.
    pub fn malformed_response(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Backend signalled that output was cut off.
    pub fn truncated(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Truncated {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Caller-supplied input failed validation.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Invalid configuration.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Uncategorized failure.
    pub fn unknown(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unknown {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

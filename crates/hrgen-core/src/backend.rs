//! The backend trait abstraction.
//!
//! A backend is an interchangeable text-generation provider. The gateway
//! dispatches through this trait so the set of backends is closed and
//! exhaustively checkable.

use crate::error::GatewayResult;
use crate::request::GenerationRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The closed set of backend selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Locally hosted inference endpoint (Ollama).
    Local,
    /// Hosted API requiring an API key (Groq).
    Cloud,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Cloud => f.write_str("cloud"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "cloud" => Ok(Self::Cloud),
            other => Err(format!("unknown backend kind '{other}'")),
        }
    }
}

/// Result of a backend health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Backend is reachable and serving.
    Healthy,
    /// Backend is reachable but throttling or impaired.
    Degraded,
    /// Backend is unreachable or erroring.
    Unhealthy,
}

impl HealthStatus {
    /// Whether the backend can be expected to serve requests.
    #[must_use]
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// An interchangeable text-generation backend.
///
/// Contract: [`generate`](TextBackend::generate) either returns non-empty
/// text or a typed [`GatewayError`](crate::GatewayError). It never returns
/// partial output silently; a backend-signalled cut-off surfaces as the
/// distinct `Truncated` condition.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Stable identifier of this backend instance.
    fn id(&self) -> &str;

    /// Which selector this backend serves.
    fn kind(&self) -> BackendKind;

    /// Per-attempt time bound for this backend.
    fn timeout(&self) -> Duration;

    /// Generate text for the request's prompt and parameters.
    async fn generate(&self, request: &GenerationRequest) -> GatewayResult<String>;

    /// Probe backend availability.
    async fn health(&self) -> HealthStatus;
}

//! Per-attempt telemetry events.
//!
//! The gateway reports every backend invocation, success or failure, as an
//! [`AttemptEvent`] handed to a [`TelemetrySink`]. Events are plain data;
//! whatever exports them (log lines, metrics, audit rows) lives behind the
//! sink.

use chrono::{DateTime, Utc};
use hrgen_core::{BackendKind, FailureKind, RequestId};
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of a single backend invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AttemptOutcome {
    /// The backend returned text.
    Succeeded,
    /// The backend invocation failed.
    Failed {
        /// Classified failure kind.
        kind: FailureKind,
        /// Whether the gateway may retry.
        retryable: bool,
    },
}

/// One backend invocation, as observed by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptEvent {
    /// The originating request id.
    pub request_id: RequestId,
    /// Backend instance id.
    pub backend_id: String,
    /// Backend selector.
    pub backend: BackendKind,
    /// 1-indexed attempt number.
    pub attempt: u32,
    /// Duration of this attempt only.
    pub duration: Duration,
    /// What happened.
    pub outcome: AttemptOutcome,
    /// When the attempt finished.
    pub timestamp: DateTime<Utc>,
}

impl AttemptEvent {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(
        request_id: RequestId,
        backend_id: impl Into<String>,
        backend: BackendKind,
        attempt: u32,
        duration: Duration,
        outcome: AttemptOutcome,
    ) -> Self {
        Self {
            request_id,
            backend_id: backend_id.into(),
            backend,
            attempt,
            duration,
            outcome,
            timestamp: Utc::now(),
        }
    }
}

/// Receiver for attempt events.
pub trait TelemetrySink: Send + Sync {
    /// Record one attempt.
    fn record(&self, event: &AttemptEvent);
}

/// Sink that emits each attempt as a structured tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, event: &AttemptEvent) {
        match event.outcome {
            AttemptOutcome::Succeeded => info!(
                request_id = %event.request_id,
                backend = %event.backend_id,
                attempt = event.attempt,
                duration_ms = event.duration.as_millis() as u64,
                "generation attempt succeeded"
            ),
            AttemptOutcome::Failed { kind, retryable } => warn!(
                request_id = %event.request_id,
                backend = %event.backend_id,
                attempt = event.attempt,
                duration_ms = event.duration.as_millis() as u64,
                kind = %kind,
                retryable,
                "generation attempt failed"
            ),
        }
    }
}

/// Sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&self, _event: &AttemptEvent) {}
}

/// Sink that buffers events in memory. Intended for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AttemptEvent>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AttemptEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, event: &AttemptEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

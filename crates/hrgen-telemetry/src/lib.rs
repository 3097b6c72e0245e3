//! # HRGen Telemetry
//!
//! Observability for the generation gateway:
//! - Per-attempt telemetry events as plain data
//! - A sink trait so callers own the export pipeline
//! - Structured logging setup with `tracing-subscriber`
//!
//! The gateway emits events; it does not own metrics or log transport.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod events;
pub mod logging;

// Re-export main types
pub use events::{AttemptEvent, AttemptOutcome, MemorySink, NullSink, TelemetrySink, TracingSink};
pub use logging::{init_logging, LoggingConfig, LoggingError};

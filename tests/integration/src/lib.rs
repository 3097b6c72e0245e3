//! Integration tests for the HRGen generation gateway.
//!
//! These exercise the full stack below the (out-of-scope) HTTP handler
//! layer: settings loading, backend adapters against wiremock servers, the
//! retry loop, and telemetry capture.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod mock_backends;

pub use fixtures::*;
pub use mock_backends::*;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod e2e_tests;

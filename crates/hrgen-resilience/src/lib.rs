//! # HRGen Resilience
//!
//! Resilience primitives for the generation gateway:
//! - Retry policy with exponential backoff and optional full jitter
//! - Timeout bounding for in-flight attempts
//!
//! The retry policy is an explicit value object composed into the gateway,
//! not a cross-cutting wrapper, so backoff behavior is testable in isolation
//! from backend logic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod retry;
pub mod timeout;

// Re-export main types
pub use retry::{RetryConfig, RetryPolicy, RetryPolicyBuilder};
pub use timeout::bounded;

//! # HRGen Gateway
//!
//! The generation gateway sits between a caller (an HTTP handler layer, out
//! of scope here) and the interchangeable text-generation backends. It
//! resolves the request's backend selector, invokes the adapter with bounded
//! retries and exponential backoff, reports every attempt to a telemetry
//! sink, and returns generated text or a typed failure.
//!
//! The gateway holds no mutable shared state across calls: concurrent
//! submissions are independent and need no external locking.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gateway;

pub use gateway::{BackendHealth, Gateway};

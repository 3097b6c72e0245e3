//! # HRGen Core
//!
//! Core types, traits, and error handling for the HR document generation
//! gateway.
//!
//! This crate provides the foundational types used throughout the gateway:
//! - Generation request, result, and failure types
//! - The backend trait abstraction
//! - The failure taxonomy and error types
//! - Validated domain types (newtypes)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types
pub use backend::{BackendKind, HealthStatus, TextBackend};
pub use error::{FailureKind, GatewayError, GatewayResult};
pub use request::{GenerationParams, GenerationRequest, GenerationRequestBuilder};
pub use response::{GenerationFailure, GenerationResult};
pub use types::{MaxTokens, RequestId, Temperature};

//! # HRGen Backends
//!
//! Backend adapter implementations for the generation gateway:
//! - Ollama (locally hosted inference endpoint)
//! - Groq (hosted OpenAI-compatible API)
//!
//! Each adapter owns one pooled HTTP client, speaks its backend's wire
//! format, and normalizes every failure into the gateway taxonomy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod groq;
pub mod ollama;
pub mod registry;

// Re-export main types
pub use groq::{GroqBackend, GroqConfig};
pub use ollama::{OllamaBackend, OllamaConfig};
pub use registry::BackendRegistry;

//! Generation request types.
//!
//! A [`GenerationRequest`] is constructed through its builder from already
//! parsed caller input, validated once, and immutable afterwards. One request
//! is created per call and discarded when the call returns.

use crate::backend::BackendKind;
use crate::error::{GatewayError, GatewayResult};
use crate::types::{MaxTokens, RequestId, Temperature};
use serde::Serialize;

/// Generation parameters shared by both backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GenerationParams {
    /// Sampling temperature.
    pub temperature: Temperature,
    /// Maximum tokens to generate.
    pub max_tokens: MaxTokens,
}

/// An immutable, validated generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    id: RequestId,
    prompt: String,
    backend: BackendKind,
    params: GenerationParams,
}

impl GenerationRequest {
    /// Create a request with default parameters.
    ///
    /// # Errors
    /// Returns a validation error if the prompt is empty.
    pub fn new(prompt: impl Into<String>, backend: BackendKind) -> GatewayResult<Self> {
        Self::builder().prompt(prompt).backend(backend).build()
    }

    /// Start building a request.
    #[must_use]
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// Unique request identifier.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The prompt text. Guaranteed non-empty.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Which backend this request targets.
    #[must_use]
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Generation parameters.
    #[must_use]
    pub fn params(&self) -> GenerationParams {
        self.params
    }
}

/// Builder for [`GenerationRequest`].
#[derive(Debug, Default)]
pub struct GenerationRequestBuilder {
    prompt: Option<String>,
    backend: Option<BackendKind>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    params: Option<GenerationParams>,
}

impl GenerationRequestBuilder {
    /// Set the prompt text.
    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Select the backend.
    #[must_use]
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the sampling temperature (validated on build).
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the token limit (validated on build).
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Use pre-validated parameters, e.g. per-backend configured defaults.
    ///
    /// Individual `temperature`/`max_tokens` calls override these.
    #[must_use]
    pub fn params(mut self, params: GenerationParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Validate and build the request.
    ///
    /// # Errors
    /// Returns a validation error if the prompt is missing or empty, the
    /// backend selector is missing, or a parameter is out of range.
    pub fn build(self) -> GatewayResult<GenerationRequest> {
        let prompt = self
            .prompt
            .ok_or_else(|| GatewayError::validation("prompt", "is required"))?;
        if prompt.trim().is_empty() {
            return Err(GatewayError::validation("prompt", "must not be empty"));
        }
        let backend = self
            .backend
            .ok_or_else(|| GatewayError::validation("backend", "is required"))?;

        let base = self.params.unwrap_or_default();
        let temperature = match self.temperature {
            Some(value) => Temperature::new(value)?,
            None => base.temperature,
        };
        let max_tokens = match self.max_tokens {
            Some(value) => MaxTokens::new(value)?,
            None => base.max_tokens,
        };

        Ok(GenerationRequest {
            id: RequestId::generate(),
            prompt,
            backend,
            params: GenerationParams {
                temperature,
                max_tokens,
            },
        })
    }
}

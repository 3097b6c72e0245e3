//! Validated domain types (newtypes).
//!
//! These types enforce the value ranges the generation backends accept, so an
//! out-of-range parameter is rejected at construction time rather than on the
//! wire.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Upper bound on tokens a single generation may produce.
pub const MAX_TOKENS_LIMIT: u32 = 8_000;

/// Upper bound on sampling temperature.
pub const TEMPERATURE_MAX: f32 = 2.0;

/// Unique identifier for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new random request id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sampling temperature, valid in `[0.0, 2.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Temperature(f32);

impl Temperature {
    /// Create a validated temperature.
    ///
    /// # Errors
    /// Returns a validation error if the value is outside `[0.0, 2.0]` or is
    /// not finite.
    pub fn new(value: f32) -> Result<Self, GatewayError> {
        if !value.is_finite() || !(0.0..=TEMPERATURE_MAX).contains(&value) {
            return Err(GatewayError::validation(
                "temperature",
                format!("must be in [0.0, {TEMPERATURE_MAX}], got {value}"),
            ));
        }
        Ok(Self(value))
    }

    /// The raw value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self(0.7)
    }
}

impl TryFrom<f32> for Temperature {
    type Error = GatewayError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Temperature> for f32 {
    fn from(value: Temperature) -> Self {
        value.0
    }
}

/// Maximum number of tokens to generate, valid in `[1, 8000]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MaxTokens(u32);

impl MaxTokens {
    /// Create a validated token limit.
    ///
    /// # Errors
    /// Returns a validation error if the value is zero or exceeds
    /// [`MAX_TOKENS_LIMIT`].
    pub fn new(value: u32) -> Result<Self, GatewayError> {
        if value == 0 || value > MAX_TOKENS_LIMIT {
            return Err(GatewayError::validation(
                "max_tokens",
                format!("must be in [1, {MAX_TOKENS_LIMIT}], got {value}"),
            ));
        }
        Ok(Self(value))
    }

    /// The raw value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for MaxTokens {
    fn default() -> Self {
        Self(2_000)
    }
}

impl TryFrom<u32> for MaxTokens {
    type Error = GatewayError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MaxTokens> for u32 {
    fn from(value: MaxTokens) -> Self {
        value.0
    }
}

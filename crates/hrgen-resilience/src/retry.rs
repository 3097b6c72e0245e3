//! Retry policy with exponential backoff.
//!
//! For 1-indexed attempt `n` the deterministic wait is
//! `min(max_delay, base_delay * 2^(n-1))`. With jitter enabled the actual
//! wait is drawn uniformly from `[0, wait]` (full jitter), so simultaneous
//! failures do not retry in lockstep. A rate-limit retry-after hint is
//! treated as a minimum bound: the policy never schedules a retry sooner
//! than the server asked for.

use hrgen_core::GatewayError;
use rand::Rng;
use std::time::Duration;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of backend invocations (>= 1).
    pub max_attempts: u32,
    /// Base delay before the first retry.
    pub base_delay: Duration,
    /// Cap on the computed delay.
    pub max_delay: Duration,
    /// Apply full jitter to computed delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

/// Retry policy value object. Constructed once per gateway instance and
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration.
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Maximum number of backend invocations.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Whether this error should consume a retry slot.
    #[must_use]
    pub fn is_retryable(&self, error: &GatewayError) -> bool {
        error.is_retryable()
    }

    /// Deterministic backoff for a 1-indexed attempt, before jitter.
    #[must_use]
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let base = self.config.base_delay.as_millis() as f64;
        let wait = base * 2f64.powi((attempt - 1) as i32);
        let wait = wait.min(self.config.max_delay.as_millis() as f64);
        Duration::from_millis(wait as u64)
    }

    /// The wait to apply after a failed 1-indexed attempt.
    ///
    /// Applies jitter if enabled, then raises the result to at least
    /// `retry_after` when the server supplied a hint.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let wait = self.backoff_for_attempt(attempt);
        let mut delay = if self.config.jitter && !wait.is_zero() {
            let millis = rand::thread_rng().gen_range(0..=wait.as_millis() as u64);
            Duration::from_millis(millis)
        } else {
            wait
        };
        if let Some(hint) = retry_after {
            delay = delay.max(hint);
        }
        delay
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

/// Builder for [`RetryPolicy`].
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    config: RetryConfig,
}

impl RetryPolicyBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max attempts.
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n.max(1);
        self
    }

    /// Set base delay.
    #[must_use]
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    /// Set max delay.
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    /// Enable or disable jitter.
    #[must_use]
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.config.jitter = jitter;
        self
    }

    /// Build the policy.
    #[must_use]
    pub fn build(self) -> RetryPolicy {
        RetryPolicy::new(self.config)
    }
}

//! # HRGen Config
//!
//! Startup configuration for the generation gateway.
//!
//! Settings are loaded once at process startup from a TOML or YAML file,
//! optionally overlaid with the API-key environment variable, validated, and
//! then passed by reference into the gateway. No other crate reads the
//! environment or holds ambient configuration state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use validator::Validate;

/// Environment variables consulted for the cloud API key, in order.
const API_KEY_ENV_VARS: [&str; 2] = ["HRGEN_GROQ_API_KEY", "GROQ_API_KEY"];

/// Configuration loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file extension is not a supported format.
    #[error("unsupported config format '{extension}' (expected toml, yaml, or yml)")]
    UnsupportedFormat {
        /// The offending extension.
        extension: String,
    },

    /// TOML parse failure.
    #[error("invalid TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// YAML parse failure.
    #[error("invalid YAML config: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    /// A value failed validation.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// What failed and why.
        message: String,
    },

    /// The cloud API key is missing from both file and environment.
    #[error("cloud API key missing: set cloud.api_key or one of {variables}")]
    MissingSecret {
        /// The environment variables that were consulted.
        variables: String,
    },
}

/// Service-level settings.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ServiceSettings {
    /// Service name used in log output.
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Deployment environment (development, staging, production).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON-formatted log lines.
    #[serde(default)]
    pub log_json: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Local (Ollama) backend settings.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LocalBackendSettings {
    /// Base URL of the Ollama API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_ollama_model")]
    pub model: String,
    /// Per-attempt timeout.
    #[serde(with = "humantime_serde", default = "default_backend_timeout")]
    pub timeout: Duration,
    /// Default sampling temperature for requests without an explicit value.
    #[serde(default = "default_temperature")]
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    /// Default token limit for requests without an explicit value.
    #[serde(default = "default_max_tokens")]
    #[validate(range(min = 1, max = 8000))]
    pub max_tokens: u32,
}

impl Default for LocalBackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            timeout: default_backend_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Cloud (Groq) backend settings.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CloudBackendSettings {
    /// API key. May instead come from the environment overlay.
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_groq_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_groq_model")]
    pub model: String,
    /// Per-attempt timeout.
    #[serde(with = "humantime_serde", default = "default_backend_timeout")]
    pub timeout: Duration,
    /// Default sampling temperature for requests without an explicit value.
    #[serde(default = "default_temperature")]
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    /// Default token limit for requests without an explicit value.
    #[serde(default = "default_max_tokens")]
    #[validate(range(min = 1, max = 8000))]
    pub max_tokens: u32,
}

impl Default for CloudBackendSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_groq_url(),
            model: default_groq_model(),
            timeout: default_backend_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Retry policy settings.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    /// Maximum backend invocations per submit.
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
    /// Base delay before the first retry.
    #[serde(with = "humantime_serde", default = "default_base_delay")]
    pub base_delay: Duration,
    /// Cap on the computed delay.
    #[serde(with = "humantime_serde", default = "default_max_delay")]
    pub max_delay: Duration,
    /// Apply full jitter to computed delays.
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
            max_delay: default_max_delay(),
            jitter: true,
        }
    }
}

/// Top-level gateway settings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GatewaySettings {
    /// Service-level settings.
    #[serde(default)]
    #[validate(nested)]
    pub service: ServiceSettings,
    /// Local backend settings.
    #[serde(default)]
    #[validate(nested)]
    pub local: LocalBackendSettings,
    /// Cloud backend settings.
    #[serde(default)]
    #[validate(nested)]
    pub cloud: CloudBackendSettings,
    /// Retry policy settings.
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetrySettings,
}

impl GatewaySettings {
    /// Load settings from a file, overlay the environment, and validate.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or a value
    /// fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let mut settings = match extension {
            "toml" => Self::from_toml(&contents)?,
            "yaml" | "yml" => Self::from_yaml(&contents)?,
            other => {
                return Err(ConfigError::UnsupportedFormat {
                    extension: other.to_string(),
                })
            }
        };

        settings.overlay(|name| std::env::var(name).ok());
        settings.ensure_valid()?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(settings)
    }

    /// Parse settings from a TOML string.
    ///
    /// # Errors
    /// Returns a parse error on invalid TOML.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Parse settings from a YAML string.
    ///
    /// # Errors
    /// Returns a parse error on invalid YAML.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Fill the API key from a variable lookup when the file omitted it.
    ///
    /// The lookup abstraction keeps the overlay testable without mutating
    /// process environment.
    pub fn overlay(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.cloud.api_key.is_none() {
            for name in API_KEY_ENV_VARS {
                if let Some(value) = lookup(name) {
                    if !value.is_empty() {
                        self.cloud.api_key = Some(SecretString::new(value));
                        break;
                    }
                }
            }
        }
    }

    /// Validate all settings.
    ///
    /// # Errors
    /// Returns the first validation failure, or a missing-secret error when
    /// no API key was supplied by file or environment.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.validate().map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
        if self.cloud.api_key.is_none() {
            return Err(ConfigError::MissingSecret {
                variables: API_KEY_ENV_VARS.join(", "),
            });
        }
        if self.retry.base_delay > self.retry.max_delay {
            return Err(ConfigError::Invalid {
                message: "retry.base_delay must not exceed retry.max_delay".to_string(),
            });
        }
        Ok(())
    }
}

fn default_service_name() -> String {
    "hrgen-gateway".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "deepseek-r1:8b".to_string()
}

fn default_groq_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_backend_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOML_CONFIG: &str = r#"
[service]
name = "hrgen-gateway"
environment = "production"
log_level = "debug"

[local]
base_url = "http://ollama.internal:11434"
model = "llama3:8b"
timeout = "90s"

[cloud]
api_key = "gsk_file_key"
model = "llama-3.3-70b-versatile"
temperature = 0.5

[retry]
max_attempts = 4
base_delay = "250ms"
max_delay = "8s"
jitter = false
"#;

    #[test]
    fn parses_toml() {
        let settings = GatewaySettings::from_toml(TOML_CONFIG).expect("valid toml");
        assert_eq!(settings.service.environment, "production");
        assert_eq!(settings.local.base_url, "http://ollama.internal:11434");
        assert_eq!(settings.local.timeout, Duration::from_secs(90));
        assert_eq!(settings.retry.max_attempts, 4);
        assert_eq!(settings.retry.base_delay, Duration::from_millis(250));
        assert!(!settings.retry.jitter);
        assert!(settings.cloud.api_key.is_some());
        settings.ensure_valid().expect("valid settings");
    }

    #[test]
    fn parses_yaml() {
        let yaml = r#"
cloud:
  api_key: gsk_yaml_key
  timeout: 45s
retry:
  max_attempts: 2
"#;
        let settings = GatewaySettings::from_yaml(yaml).expect("valid yaml");
        assert_eq!(settings.cloud.timeout, Duration::from_secs(45));
        assert_eq!(settings.retry.max_attempts, 2);
        // Unspecified sections fall back to defaults.
        assert_eq!(settings.local.base_url, "http://localhost:11434");
    }

    #[test]
    fn loads_from_file_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        file.write_all(TOML_CONFIG.as_bytes()).expect("write");
        let settings = GatewaySettings::load(file.path()).expect("load");
        assert_eq!(settings.retry.max_attempts, 4);
    }

    #[test]
    fn rejects_unknown_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".ini")
            .tempfile()
            .expect("temp file");
        file.write_all(b"[service]").expect("write");
        let err = GatewaySettings::load(file.path()).expect_err("should fail");
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn overlay_fills_missing_api_key() {
        let mut settings = GatewaySettings::default();
        assert!(settings.cloud.api_key.is_none());
        settings.overlay(|name| {
            (name == "HRGEN_GROQ_API_KEY").then(|| "gsk_env_key".to_string())
        });
        assert!(settings.cloud.api_key.is_some());
    }

    #[test]
    fn overlay_does_not_replace_file_key() {
        let mut settings = GatewaySettings::from_toml(TOML_CONFIG).expect("valid toml");
        settings.overlay(|_| Some("gsk_env_key".to_string()));
        use secrecy::ExposeSecret;
        let key = settings.cloud.api_key.expect("present");
        assert_eq!(key.expose_secret(), "gsk_file_key");
    }

    #[test]
    fn missing_api_key_fails_validation() {
        let settings = GatewaySettings::default();
        let err = settings.ensure_valid().expect_err("should fail");
        assert!(matches!(err, ConfigError::MissingSecret { .. }));
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let mut settings = GatewaySettings::default();
        settings.cloud.api_key = Some(SecretString::new("gsk_key".to_string()));
        settings.retry.max_attempts = 0;
        assert!(matches!(
            settings.ensure_valid(),
            Err(ConfigError::Invalid { .. })
        ));

        let mut settings = GatewaySettings::default();
        settings.cloud.api_key = Some(SecretString::new("gsk_key".to_string()));
        settings.local.temperature = 3.0;
        assert!(settings.ensure_valid().is_err());
    }

    #[test]
    fn base_delay_must_not_exceed_max_delay() {
        let mut settings = GatewaySettings::default();
        settings.cloud.api_key = Some(SecretString::new("gsk_key".to_string()));
        settings.retry.base_delay = Duration::from_secs(20);
        settings.retry.max_delay = Duration::from_secs(10);
        assert!(settings.ensure_valid().is_err());
    }
}

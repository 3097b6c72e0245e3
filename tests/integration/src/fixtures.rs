//! Shared fixtures: settings pointed at mock servers and gateway assembly.

use hrgen_config::GatewaySettings;
use hrgen_gateway::Gateway;
use hrgen_telemetry::MemorySink;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

/// Settings wired to the given mock server URLs, with fast retries so tests
/// do not sit in real backoff.
#[must_use]
pub fn test_settings(local_url: &str, cloud_url: &str) -> GatewaySettings {
    let mut settings = GatewaySettings::default();
    settings.local.base_url = local_url.to_string();
    settings.local.timeout = Duration::from_secs(5);
    settings.cloud.api_key = Some(SecretString::new("gsk_test_key".to_string()));
    settings.cloud.base_url = cloud_url.to_string();
    settings.cloud.timeout = Duration::from_secs(5);
    settings.retry.max_attempts = 3;
    settings.retry.base_delay = Duration::from_millis(1);
    settings.retry.max_delay = Duration::from_millis(10);
    settings.retry.jitter = false;
    settings
}

/// A gateway built from [`test_settings`] plus the memory sink capturing its
/// attempt events.
pub fn test_gateway(settings: &GatewaySettings) -> (Gateway, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let events = Arc::clone(&sink);
    let gateway = Gateway::from_settings(settings, sink).expect("gateway from settings");
    (gateway, events)
}

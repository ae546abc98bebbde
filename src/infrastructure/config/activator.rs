//! Activator connection settings.

use serde::Deserialize;

/// Where the activator lives and how to talk to it.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivatorConfig {
    /// Base URL of the activator (proxy adapter).
    ///
    /// Overridden by `KGRID_PROXY_ADAPTER_URL`.
    #[serde(default = "default_activator_url")]
    pub url: String,
    #[serde(default)]
    pub http: ActivatorHttpConfig,
}

fn default_activator_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ActivatorConfig {
    fn default() -> Self {
        Self {
            url: default_activator_url(),
            http: ActivatorHttpConfig::default(),
        }
    }
}

/// HTTP behaviour of the announcement calls.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivatorHttpConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Attempts per call, counting the first one.
    #[serde(default = "default_http_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Pause between attempts in milliseconds.
    #[serde(default = "default_http_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

const fn default_http_timeout_ms() -> u64 {
    5000
}

const fn default_http_connect_timeout_ms() -> u64 {
    2000
}

const fn default_http_retry_max_attempts() -> u32 {
    3
}

const fn default_http_retry_backoff_ms() -> u64 {
    500
}

impl Default for ActivatorHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
            retry_max_attempts: default_http_retry_max_attempts(),
            retry_backoff_ms: default_http_retry_backoff_ms(),
        }
    }
}

//! Logging configuration and initialization.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".into()
}

fn default_format() -> String {
    "pretty".into()
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Calling this
    /// more than once keeps the first subscriber. Logs go to stderr so that
    /// command output on stdout stays machine readable.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let _ = match self.format.as_str() {
            "json" => fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init(),
            _ => fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init(),
        };
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

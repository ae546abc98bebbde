//! Application configuration loading and validation.
//!
//! Configuration comes from, in increasing precedence:
//!
//! 1. the packaged `config.toml` compiled into the binary,
//! 2. a TOML file given on the command line (or `./config.toml`),
//! 3. the environment: `KGRID_PROXY_ADAPTER_URL` and `KGRID_NODE_ENV_URL`.
//!
//! # Example
//!
//! ```no_run
//! use kgrid_node::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::activator::ActivatorConfig;
use super::logging::LoggingConfig;
use crate::domain::info::ENGINE;
use crate::error::{ConfigError, Result};

/// Environment variable overriding the activator URL.
pub const ACTIVATOR_URL_ENV: &str = "KGRID_PROXY_ADAPTER_URL";
/// Environment variable overriding the URL this node announces.
pub const NODE_URL_ENV: &str = "KGRID_NODE_ENV_URL";

const PACKAGED_CONFIG: &str = include_str!("../../../config.toml");
const LOCAL_CONFIG: &str = "config.toml";

/// This node's identity towards the activator.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Engine name announced to the activator.
    #[serde(default = "default_engine")]
    pub engine: String,
    /// URL at which this node is reachable. Overridden by `KGRID_NODE_ENV_URL`.
    #[serde(default = "default_node_url")]
    pub url: String,
}

fn default_engine() -> String {
    ENGINE.to_string()
}

fn default_node_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            url: default_node_url(),
        }
    }
}

/// Location of the shelf directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ShelfConfig {
    #[serde(default = "default_shelf_path")]
    pub path: PathBuf,
}

fn default_shelf_path() -> PathBuf {
    PathBuf::from("shelf")
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            path: default_shelf_path(),
        }
    }
}

/// Execution limits.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Budget for one execution when the caller gives none.
    #[serde(default = "default_execution_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_execution_timeout_ms() -> u64 {
    30_000
}

impl ExecutionConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_execution_timeout_ms(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub activator: ActivatorConfig,

    #[serde(default)]
    pub shelf: ShelfConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content, apply environment overrides
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or fails
    /// validation.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// The configuration packaged with the binary, plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override makes the configuration invalid.
    #[allow(clippy::result_large_err)]
    pub fn packaged() -> Result<Self> {
        Self::parse_toml(PACKAGED_CONFIG)
    }

    /// Pick the configuration source: `path` if given, else `./config.toml`
    /// if present, else the packaged configuration.
    ///
    /// # Errors
    ///
    /// Propagates load and validation errors.
    #[allow(clippy::result_large_err)]
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(LOCAL_CONFIG).is_file() => Self::load(LOCAL_CONFIG),
            None => Self::packaged(),
        }
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(url) = get(ACTIVATOR_URL_ENV) {
            self.activator.url = url;
        }
        if let Some(url) = get(NODE_URL_ENV) {
            self.node.url = url;
        }
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.node.engine.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "engine" }.into());
        }
        if self.node.url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "node.url" }.into());
        }
        if self.activator.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "activator.url",
            }
            .into());
        }
        let parsed = Url::parse(&self.activator.url).map_err(|e| ConfigError::InvalidValue {
            field: "activator.url",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "activator.url",
                reason: "must be an http or https URL".to_string(),
            }
            .into());
        }
        if self.shelf.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "shelf.path" }.into());
        }
        if self.execution.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.activator.http.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry_max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

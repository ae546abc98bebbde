use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::ObjectId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Shelf storage errors.
///
/// A corrupt snapshot at startup is fatal; the same errors raised by later
/// writes are returned to the caller of the mutating operation.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed shelf file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("record key {key} does not match identifier {expected} derived from '{uri}'")]
    KeyMismatch {
        key: String,
        expected: ObjectId,
        uri: String,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Executor construction failures. Scoped to a single record.
#[derive(Error, Debug)]
pub enum ActivationError {
    #[error("invalid source descriptor: {reason}")]
    InvalidDescriptor { reason: String },

    #[error("source not found at {location}")]
    MissingSource { location: String },

    #[error("failed to construct executor: {0}")]
    Construction(String),
}

/// Failures raised while running an executor.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("execution timed out after {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("execution failed: {0}")]
    Failed(String),

    #[error("failed to encode executor input: {0}")]
    InvalidInput(#[source] serde_json::Error),

    #[error("executor produced invalid output: {0}")]
    InvalidOutput(#[source] serde_json::Error),

    #[error("executor I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote executor request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ExecutionError {
    /// True when the invocation exceeded its time budget.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Why a lookup did not resolve to a live executor.
///
/// Callers treat every reason the same way; the distinction exists for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No record with this identifier.
    Unknown,
    /// The record exists but is not activated.
    Deactivated,
    /// The URI could not be turned into an identifier.
    MalformedUri,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Unknown => "unknown",
            Self::Deactivated => "deactivated",
            Self::MalformedUri => "malformed uri",
        };
        f.write_str(reason)
    }
}

/// No activated object matches the requested identifier or URI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no activated object for {target}")]
pub struct NotFound {
    /// The identifier or URI that was requested.
    pub target: String,
    pub reason: NotFoundReason,
}

impl NotFound {
    pub fn new(target: impl Into<String>, reason: NotFoundReason) -> Self {
        Self {
            target: target.into(),
            reason,
        }
    }
}

/// Failures talking to the activator during startup.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("activator request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("activator response from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Outcome of a registry operation that did not complete.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("activation of {id} failed: {source}")]
    Activation {
        id: ObjectId,
        #[source]
        source: ActivationError,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("object {id} is activated; deactivate it first")]
    Busy { id: ObjectId },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Outcome of an execution request that did not produce output.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl DispatchError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

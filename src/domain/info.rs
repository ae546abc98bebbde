//! Self-description of a running node.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Engine name this runtime announces to the activator.
pub const ENGINE: &str = "node";

/// Public information about the node, suitable for an info endpoint.
///
/// `activator_url` stays empty until the activator acknowledged the
/// environment registration.
#[derive(Debug, Serialize)]
pub struct NodeInfo {
    pub app: String,
    pub version: String,
    pub engine: String,
    pub status: String,
    pub url: String,
    #[serde(serialize_with = "serialize_activator_url")]
    activator_url: RwLock<String>,
    pub started_at: DateTime<Utc>,
}

fn serialize_activator_url<S>(value: &RwLock<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.read())
}

impl NodeInfo {
    #[must_use]
    pub fn new(engine: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            app: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            engine: engine.into(),
            status: "up".to_string(),
            url: url.into(),
            activator_url: RwLock::new(String::new()),
            started_at: Utc::now(),
        }
    }

    /// Activator this node is registered with, empty if none yet.
    #[must_use]
    pub fn activator_url(&self) -> String {
        self.activator_url.read().clone()
    }

    pub fn set_activator_url(&self, url: impl Into<String>) {
        *self.activator_url.write() = url.into();
    }
}

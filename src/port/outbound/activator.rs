//! Activator (orchestrator) port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RegistrationError;

/// Body of the environment registration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentAnnouncement {
    pub engine: String,
    pub url: String,
}

/// The remote activator this node registers with.
#[async_trait]
pub trait Activator: Send + Sync {
    /// Base URL of the activator, for logs and node info.
    fn base_url(&self) -> &str;

    /// Announce this node's engine and address. Returns the activator's reply.
    async fn register_environment(
        &self,
        announcement: &EnvironmentAnnouncement,
    ) -> Result<Value, RegistrationError>;

    /// Ask the activator to activate every object for `engine`.
    async fn request_activation(&self, engine: &str) -> Result<(), RegistrationError>;
}

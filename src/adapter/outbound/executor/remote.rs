//! Remote executor: the object runs behind another HTTP endpoint.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use url::Url;

use crate::domain::record::{SourceDescriptor, SourceKind};
use crate::error::{ActivationError, ExecutionError};
use crate::port::outbound::executor::Executor;

/// Executor that POSTs its input to `endpoint` and returns the JSON reply.
#[derive(Debug, Clone)]
pub struct RemoteExecutor {
    http: HttpClient,
    endpoint: Url,
}

impl RemoteExecutor {
    /// Build from a descriptor whose `location` is an absolute http(s) URL.
    pub fn initialize(source: &SourceDescriptor, http: HttpClient) -> Result<Self, ActivationError> {
        let location =
            source
                .location
                .as_deref()
                .ok_or_else(|| ActivationError::InvalidDescriptor {
                    reason: "remote source requires a location".to_string(),
                })?;

        let endpoint = Url::parse(location).map_err(|e| ActivationError::InvalidDescriptor {
            reason: format!("invalid remote location '{location}': {e}"),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ActivationError::InvalidDescriptor {
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        Ok(Self { http, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Executor for RemoteExecutor {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn run(&self, input: Value) -> Result<Value, ExecutionError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&input)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

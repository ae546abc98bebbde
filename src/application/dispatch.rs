//! Execution dispatch.
//!
//! Resolves a request to a live executor through the registry and runs it
//! under a time budget. Failed executions are reported, never retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use super::registry::ActivationRegistry;
use crate::domain::id::ObjectId;
use crate::error::{DispatchError, ExecutionError};
use crate::port::outbound::executor::SharedExecutor;

pub struct ExecutionDispatcher {
    registry: Arc<ActivationRegistry>,
    default_timeout: Duration,
}

impl ExecutionDispatcher {
    /// `default_timeout` applies when a caller does not supply one.
    pub fn new(registry: Arc<ActivationRegistry>, default_timeout: Duration) -> Self {
        Self {
            registry,
            default_timeout,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ActivationRegistry> {
        &self.registry
    }

    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run the object identified by `id`.
    pub async fn execute_by_hash(
        &self,
        id: &ObjectId,
        input: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, DispatchError> {
        let executor = self.registry.lookup_by_hash(id)?;
        Ok(self.execute(&executor, input, timeout).await?)
    }

    /// Run the object with canonical `uri`.
    pub async fn execute_by_uri(
        &self,
        uri: &str,
        input: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, DispatchError> {
        let executor = self.registry.lookup_by_uri(uri)?;
        Ok(self.execute(&executor, input, timeout).await?)
    }

    /// Run an already resolved executor.
    ///
    /// On timeout the run future is dropped, which lets the executor clean
    /// up after itself; the registry is not touched.
    pub async fn execute(
        &self,
        executor: &SharedExecutor,
        input: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, ExecutionError> {
        let limit = timeout.unwrap_or(self.default_timeout);
        let invocation = Uuid::new_v4();
        let span = info_span!("execute", %invocation, kind = %executor.kind());

        async move {
            let started = Instant::now();
            let result = match tokio::time::timeout(limit, executor.run(input)).await {
                Ok(result) => result,
                Err(_) => Err(ExecutionError::Timeout { timeout: limit }),
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match &result {
                Ok(_) => debug!(elapsed_ms, "Execution finished"),
                Err(e) => warn!(elapsed_ms, error = %e, "Execution failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

//! Inline executor.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::record::{SourceDescriptor, SourceKind};
use crate::error::{ActivationError, ExecutionError};
use crate::port::outbound::executor::Executor;

/// Executor whose output is the `body` of its descriptor.
#[derive(Debug, Clone)]
pub struct InlineExecutor {
    body: Value,
}

impl InlineExecutor {
    /// Build from a descriptor. A `body` is required.
    pub fn initialize(source: &SourceDescriptor) -> Result<Self, ActivationError> {
        let body = source
            .body
            .clone()
            .ok_or_else(|| ActivationError::InvalidDescriptor {
                reason: "inline source requires a body".to_string(),
            })?;
        Ok(Self { body })
    }
}

#[async_trait]
impl Executor for InlineExecutor {
    fn kind(&self) -> SourceKind {
        SourceKind::Inline
    }

    async fn run(&self, _input: Value) -> Result<Value, ExecutionError> {
        Ok(self.body.clone())
    }
}

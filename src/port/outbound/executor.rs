//! Executor port.
//!
//! An executor is the runtime handle for one activated object. Executors are
//! built by an [`ExecutorFactory`] from the record's source descriptor and
//! live until the record is deactivated; an in-flight invocation keeps its
//! handle alive past a concurrent deactivate.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::record::{SourceDescriptor, SourceKind};
use crate::error::{ActivationError, ExecutionError};

/// Runs an activated object.
#[async_trait]
pub trait Executor: Send + Sync + fmt::Debug {
    /// The source kind this executor was built from.
    fn kind(&self) -> SourceKind;

    /// Run the object against `input` and return its output.
    ///
    /// Implementations release their own resources when the returned future
    /// is dropped before completion.
    async fn run(&self, input: Value) -> Result<Value, ExecutionError>;
}

/// Shared handle to a live executor.
pub type SharedExecutor = Arc<dyn Executor>;

/// Builds initialized executors from source descriptors.
///
/// A factory never touches the registry; it only turns a descriptor into an
/// executor or explains why it could not.
#[async_trait]
pub trait ExecutorFactory: Send + Sync {
    async fn build(&self, source: &SourceDescriptor) -> Result<SharedExecutor, ActivationError>;
}

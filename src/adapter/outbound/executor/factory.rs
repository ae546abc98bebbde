//! Default executor factory.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use super::{InlineExecutor, ProcessExecutor, RemoteExecutor};
use crate::domain::record::{SourceDescriptor, SourceKind};
use crate::error::ActivationError;
use crate::port::outbound::executor::{ExecutorFactory, SharedExecutor};

/// Picks the executor variant from `source.kind`.
#[derive(Debug, Clone)]
pub struct DefaultExecutorFactory {
    shelf_root: PathBuf,
    http: HttpClient,
}

impl DefaultExecutorFactory {
    /// `shelf_root` anchors relative process locations; `http` is shared by
    /// every remote executor.
    pub fn new(shelf_root: impl Into<PathBuf>, http: HttpClient) -> Self {
        Self {
            shelf_root: shelf_root.into(),
            http,
        }
    }
}

#[async_trait]
impl ExecutorFactory for DefaultExecutorFactory {
    async fn build(&self, source: &SourceDescriptor) -> Result<SharedExecutor, ActivationError> {
        let kind = source
            .source_kind()
            .map_err(|reason| ActivationError::InvalidDescriptor { reason })?;
        debug!(%kind, location = ?source.location, version = ?source.version, "Building executor");

        let executor: SharedExecutor = match kind {
            SourceKind::Inline => Arc::new(InlineExecutor::initialize(source)?),
            SourceKind::Process => {
                Arc::new(ProcessExecutor::initialize(source, &self.shelf_root).await?)
            }
            SourceKind::Remote => Arc::new(RemoteExecutor::initialize(source, self.http.clone())?),
        };
        Ok(executor)
    }
}

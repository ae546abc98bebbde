//! Composition root for a running node.
//!
//! Startup order: create the shelf, load the registry (a corrupt snapshot is
//! fatal), start serving, then announce to the activator in the background.

use std::path::Path;
use std::sync::Arc;

use reqwest::Client as HttpClient;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapter::outbound::activator::ActivatorClient;
use crate::adapter::outbound::executor::DefaultExecutorFactory;
use crate::adapter::outbound::shelf::FsShelf;
use crate::application::announce::spawn_announcement;
use crate::application::{ActivationRegistry, ExecutionDispatcher, LoadReport};
use crate::domain::info::NodeInfo;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::activator::Activator;
use crate::port::outbound::executor::ExecutorFactory;
use crate::port::outbound::shelf::ShelfStore;

/// A started node: loaded registry, dispatcher and node information.
pub struct Node {
    shelf: Arc<FsShelf>,
    registry: Arc<ActivationRegistry>,
    dispatcher: Arc<ExecutionDispatcher>,
    info: Arc<NodeInfo>,
    load_report: LoadReport,
    announcement: Option<JoinHandle<()>>,
}

impl Node {
    /// Start a node that announces itself to the configured activator.
    ///
    /// # Errors
    ///
    /// Fails if the shelf cannot be created or its snapshot cannot be loaded.
    pub async fn start(config: &Config) -> Result<Self> {
        let activator = Arc::new(ActivatorClient::from_config(&config.activator));
        Self::start_with(config, activator).await
    }

    /// Start a node with an explicit activator.
    ///
    /// # Errors
    ///
    /// Fails if the shelf cannot be created or its snapshot cannot be loaded.
    pub async fn start_with(config: &Config, activator: Arc<dyn Activator>) -> Result<Self> {
        let shelf = Arc::new(FsShelf::new(&config.shelf.path));
        shelf.ensure().await?;
        let metadata = shelf.metadata().await?;

        let factory: Arc<dyn ExecutorFactory> =
            Arc::new(DefaultExecutorFactory::new(shelf.root(), HttpClient::new()));
        let registry = Arc::new(ActivationRegistry::new(
            Arc::clone(&shelf) as Arc<dyn ShelfStore>,
            factory,
        ));

        let load_report = registry.load().await?;
        for (id, error) in &load_report.failures {
            warn!(id = %id, error = %error, "Object held deactivated after startup");
        }

        let dispatcher = Arc::new(ExecutionDispatcher::new(
            Arc::clone(&registry),
            config.execution.timeout(),
        ));
        let info = Arc::new(NodeInfo::new(&config.node.engine, &config.node.url));

        info!(
            version = %info.version,
            engine = %info.engine,
            url = %info.url,
            activator = %activator.base_url(),
            shelf = %shelf.root().display(),
            shelf_name = %metadata.name,
            objects = registry.len(),
            "Remote environment started"
        );

        let announcement = spawn_announcement(activator, Arc::clone(&info));

        Ok(Self {
            shelf,
            registry,
            dispatcher,
            info,
            load_report,
            announcement: Some(announcement),
        })
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ActivationRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<ExecutionDispatcher> {
        &self.dispatcher
    }

    #[must_use]
    pub fn info(&self) -> &Arc<NodeInfo> {
        &self.info
    }

    #[must_use]
    pub fn shelf_root(&self) -> &Path {
        self.shelf.root()
    }

    /// What happened while loading the shelf at startup.
    #[must_use]
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Wait until the background announcement has finished.
    pub async fn announced(&mut self) {
        if let Some(handle) = self.announcement.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Announcement task ended abnormally");
            }
        }
    }

    /// Stop announcing and release every executor.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.announcement.take() {
            handle.abort();
        }
        self.registry.shutdown().await;
        info!(engine = %self.info.engine, "Remote environment stopped");
    }
}

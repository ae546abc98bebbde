//! Handler for the `run` command.

use tokio::signal;
use tracing::info;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::node::Node;

/// Start the node and serve until interrupted.
pub async fn execute(config: &Config) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "kgrid-node starting");

    let node = Node::start(config).await?;
    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    node.shutdown().await;
    Ok(())
}

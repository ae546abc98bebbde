//! Startup announcement to the activator.
//!
//! Best effort: the node serves whatever is already activated whether or not
//! the activator can be reached. Each call carries its own bounded retry (see
//! the activator client); nothing is retried here.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::info::NodeInfo;
use crate::error::RegistrationError;
use crate::port::outbound::activator::{Activator, EnvironmentAnnouncement};

/// Register this node, then ask for activation of its engine's objects.
///
/// The activation request is only sent once registration succeeded. The
/// node's `activator_url` is recorded as soon as registration succeeds, even
/// if the activation request fails afterwards.
pub async fn announce(activator: &dyn Activator, info: &NodeInfo) -> Result<(), RegistrationError> {
    let announcement = EnvironmentAnnouncement {
        engine: info.engine.clone(),
        url: info.url.clone(),
    };

    let reply = activator.register_environment(&announcement).await?;
    info!(
        activator = %activator.base_url(),
        reply = %reply,
        "Registered remote environment in activator"
    );
    info.set_activator_url(activator.base_url());

    activator.request_activation(&info.engine).await?;
    Ok(())
}

/// Run [`announce`] on a background task. Failures are logged only.
pub fn spawn_announcement(activator: Arc<dyn Activator>, info: Arc<NodeInfo>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = announce(activator.as_ref(), &info).await {
            warn!(
                activator = %activator.base_url(),
                error = %e,
                "Activator announcement failed, serving previously activated objects"
            );
        }
    })
}

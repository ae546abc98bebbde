//! In-process activator double.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::error::RegistrationError;
use crate::port::outbound::activator::{Activator, EnvironmentAnnouncement};

/// Records every call; registration can be made to fail.
#[derive(Debug, Default)]
pub struct RecordingActivator {
    fail_registration: AtomicBool,
    announcements: Mutex<Vec<EnvironmentAnnouncement>>,
    activations: Mutex<Vec<String>>,
}

impl RecordingActivator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An activator whose registration call always fails.
    pub fn unreachable() -> Self {
        let activator = Self::default();
        activator.fail_registration.store(true, Ordering::SeqCst);
        activator
    }

    pub fn announcements(&self) -> Vec<EnvironmentAnnouncement> {
        self.announcements.lock().clone()
    }

    pub fn activations(&self) -> Vec<String> {
        self.activations.lock().clone()
    }
}

#[async_trait]
impl Activator for RecordingActivator {
    fn base_url(&self) -> &str {
        "http://activator.test"
    }

    async fn register_environment(
        &self,
        announcement: &EnvironmentAnnouncement,
    ) -> Result<Value, RegistrationError> {
        self.announcements.lock().push(announcement.clone());
        if self.fail_registration.load(Ordering::SeqCst) {
            return Err(unreachable_error());
        }
        Ok(json!({"registered": announcement.engine}))
    }

    async fn request_activation(&self, engine: &str) -> Result<(), RegistrationError> {
        self.activations.lock().push(engine.to_string());
        Ok(())
    }
}

/// A transport-level failure, produced without touching the network.
fn unreachable_error() -> RegistrationError {
    let url = "http://activator.test/proxy/environments".to_string();
    match reqwest::Client::new().get("http://[").build() {
        Err(source) => RegistrationError::Http { url, source },
        Ok(_) => unreachable!("malformed URL must not build a request"),
    }
}

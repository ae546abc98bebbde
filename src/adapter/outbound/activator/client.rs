//! HTTP client for the activator's environment API.
//!
//! Two calls are used:
//! - `POST {activator}/proxy/environments` with `{"engine", "url"}`
//! - `GET {activator}/activate/{engine}`
//!
//! Connect and timeout failures are retried a bounded number of times with a
//! fixed backoff. Error statuses are returned immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::RegistrationError;
use crate::infrastructure::config::activator::ActivatorConfig;
use crate::port::outbound::activator::{Activator, EnvironmentAnnouncement};

pub struct ActivatorClient {
    http: HttpClient,
    base_url: String,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl ActivatorClient {
    /// Client with default HTTP settings and a single attempt per call.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: trim_base(base_url.into()),
            retry_max_attempts: 1,
            retry_backoff_ms: 0,
        }
    }

    #[must_use]
    pub fn from_config(config: &ActivatorConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            base_url: trim_base(config.url.clone()),
            retry_max_attempts: config.http.retry_max_attempts,
            retry_backoff_ms: config.http.retry_backoff_ms,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<Response, RegistrationError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let err = match build().send().await {
                Ok(response) => {
                    return response
                        .error_for_status()
                        .map_err(|source| RegistrationError::Http {
                            url: url.to_string(),
                            source,
                        });
                }
                Err(err) => err,
            };

            if attempt >= max_attempts || !Self::should_retry(&err) {
                return Err(RegistrationError::Http {
                    url: url.to_string(),
                    source: err,
                });
            }
            self.backoff(attempt, max_attempts, &err).await;
        }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "Activator request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[async_trait]
impl Activator for ActivatorClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn register_environment(
        &self,
        announcement: &EnvironmentAnnouncement,
    ) -> Result<Value, RegistrationError> {
        let url = self.url("/proxy/environments");
        info!(url = %url, engine = %announcement.engine, self_url = %announcement.url, "Registering environment");

        let response = self
            .send_with_retry(&url, || self.http.post(&url).json(announcement))
            .await?;
        let body = response
            .text()
            .await
            .map_err(|source| RegistrationError::Decode {
                url: url.clone(),
                source,
            })?;

        // Replies are logged, not interpreted; keep non-JSON bodies as text.
        let reply = serde_json::from_str(&body).unwrap_or(Value::String(body));
        debug!(url = %url, reply = %reply, "Environment registered");
        Ok(reply)
    }

    async fn request_activation(&self, engine: &str) -> Result<(), RegistrationError> {
        let url = self.url(&format!("/activate/{engine}"));
        info!(url = %url, "Requesting activation");
        self.send_with_retry(&url, || self.http.get(&url)).await?;
        Ok(())
    }
}

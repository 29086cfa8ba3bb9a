//! Webhook sink: POSTs `{"priority": "...", "message": "..."}`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{NotifyError, Notifier, Priority};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Also forward `Log` priority messages.
    pub include_log: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 10,
            include_log: false,
        }
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    priority: Priority,
    message: &'a str,
}

pub struct WebhookNotifier {
    client: reqwest::blocking::Client,
    config: WebhookConfig,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::Setup(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&mut self, priority: Priority, message: &str) -> Result<(), NotifyError> {
        if priority == Priority::Log && !self.config.include_log {
            return Ok(());
        }
        let resp = self
            .client
            .post(&self.config.url)
            .json(&Payload { priority, message })
            .send()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

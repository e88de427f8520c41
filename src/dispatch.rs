//! Delivery of a [`ChatMessage`] to the incoming webhook

use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::message::ChatMessage;

/// Maximum number of characters of a rejected response body kept in the error
const MAX_ERROR_BODY_CHARS: usize = 512;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Posts messages to one webhook. A single attempt per message; retrying is
/// left to whatever invoked the plugin.
pub struct Dispatcher {
    client: reqwest::Client,
    webhook_url: Url,
}

impl Dispatcher {
    pub fn new(webhook_url: Url, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(DispatchError::Client)?;

        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// Pretty-printed JSON body for `message`, as shown by `--dry-run`
    pub fn encode(message: &ChatMessage) -> Result<String, DispatchError> {
        Ok(serde_json::to_string_pretty(message)?)
    }

    pub async fn send(&self, message: &ChatMessage) -> Result<(), DispatchError> {
        debug!("Posting notification to {}", message.channel);

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!("Failed to read webhook response body: {}", e);
                String::new()
            });
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        info!(
            "Notification delivered to {} (HTTP {})",
            message.channel,
            status.as_u16()
        );
        Ok(())
    }
}

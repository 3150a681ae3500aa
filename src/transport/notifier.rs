/// Notification sinks for alert delivery

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

const SLACK_POST_MESSAGE_API: &str = "https://slack.com/api/chat.postMessage";
const API_TIMEOUT_SECS: u64 = 15;
const TOKEN_ENV_VAR: &str = "SLACK_API_TOKEN";

/// Narrow delivery capability the control loop hands formatted batches to.
/// Delivery failure is non-fatal; the loop logs it and recomputes signals
/// on the next tick.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

pub struct SlackNotifier {
    client: Client,
    token: String,
    channel: String,
}

impl SlackNotifier {
    /// `api_token` falls back to the `SLACK_API_TOKEN` environment variable
    /// when the config omits it.
    pub fn new(channel: &str, api_token: Option<&str>) -> Result<Self> {
        let token = match api_token {
            Some(token) => token.to_string(),
            None => std::env::var(TOKEN_ENV_VAR).map_err(|_| {
                anyhow!("Slack token missing: set [slack].api_token or {TOKEN_ENV_VAR}")
            })?,
        };
        if channel.is_empty() {
            bail!("Slack channel must not be empty");
        }

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(API_TIMEOUT_SECS))
                .build()
                .expect("Failed to create Slack HTTP client"),
            token,
            channel: channel.to_string(),
        })
    }
}

#[async_trait]
impl NotificationSink for SlackNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(SLACK_POST_MESSAGE_API)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "channel": self.channel,
                "text": text,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Slack API error: {}", response.status());
        }

        // Slack reports application-level failures in the body with ok=false
        let body: serde_json::Value = response.json().await?;
        if !body["ok"].as_bool().unwrap_or(false) {
            bail!(
                "Slack rejected message: {}",
                body["error"].as_str().unwrap_or("unknown error")
            );
        }

        debug!(channel = %self.channel, bytes = text.len(), "delivered alert batch");
        Ok(())
    }
}

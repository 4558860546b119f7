use super::render::render_message;
use super::Reporter;
use crate::state::NotificationState;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct MessageResponse {
    id: String,
}

/// Posts job status to a Discord webhook and edits the message as it changes.
pub struct DiscordReporter {
    client: Client,
    webhook_url: String,
}

impl DiscordReporter {
    pub fn new(webhook_url: &str) -> Self {
        let client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            webhook_url: webhook_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, state: &NotificationState) -> Result<String> {
        let response = request
            .query(&[("wait", "true")])
            .header("Accept", "application/json")
            .json(&render_message(state))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Discord webhook request failed ({}): {}", status, body);
        }

        let message: MessageResponse =
            serde_json::from_str(&body).context("Invalid Discord webhook response")?;
        Ok(message.id)
    }

    async fn try_update(&self, state: &NotificationState) -> Result<String> {
        let id = state
            .remote_id
            .as_deref()
            .context("Notification has no remote message id")?;
        let url = format!("{}/messages/{}", self.webhook_url, id);
        self.send(self.client.patch(url), state).await
    }
}

#[async_trait::async_trait]
impl Reporter for DiscordReporter {
    async fn create(&self, state: &NotificationState) -> Result<String> {
        self.send(self.client.post(&self.webhook_url), state)
            .await
            .context("Failed to create Discord message")
    }

    async fn update(&self, state: NotificationState) -> NotificationState {
        match self.try_update(&state).await {
            Ok(id) => NotificationState {
                remote_id: Some(id),
                ..state
            },
            Err(e) => {
                tracing::warn!("Error while updating Discord message: {:#}", e);
                tracing::debug!("Notification state: {:?}", state);
                state
            }
        }
    }
}

//! Discord REST delivery for status summaries.

mod embed;

pub use embed::{MessageBody, message_body};

use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use kumaboard_domain::RenderPayload;
use kumaboard_ports::{DeliveryError, DeliveryPort};

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

const UNKNOWN_CHANNEL: u64 = 10003;
const UNKNOWN_MESSAGE: u64 = 10008;

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct DiscordDelivery {
    client: Client,
    base_url: String,
    token: String,
}

impl DiscordDelivery {
    pub fn new(token: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(token, DISCORD_API_BASE, timeout)
    }

    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build discord http client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.base_url, channel_id)
    }

    fn message_url(&self, channel_id: &str, message_id: &str) -> String {
        format!("{}/{}", self.messages_url(channel_id), message_id)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }
}

/// Maps an unsuccessful response to a delivery error.
async fn failure(response: Response, channel_id: &str, message_id: &str) -> DeliveryError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    classify(status, &body, channel_id, message_id)
}

fn classify(status: StatusCode, body: &str, channel_id: &str, message_id: &str) -> DeliveryError {
    let api_error: ApiError = serde_json::from_str(body).unwrap_or_default();
    if status == StatusCode::NOT_FOUND
        || matches!(api_error.code, UNKNOWN_CHANNEL | UNKNOWN_MESSAGE)
    {
        return DeliveryError::not_found(channel_id, message_id);
    }
    DeliveryError::Other(anyhow!(
        "discord api returned {}: {} (code {})",
        status.as_u16(),
        api_error.message,
        api_error.code
    ))
}

#[async_trait]
impl DeliveryPort for DiscordDelivery {
    async fn create(
        &self,
        destination_id: &str,
        payload: &RenderPayload,
    ) -> Result<String, DeliveryError> {
        let response = self
            .client
            .post(self.messages_url(destination_id))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&message_body(payload))
            .send()
            .await
            .context("failed to send create message request")?;
        if !response.status().is_success() {
            return Err(failure(response, destination_id, "").await);
        }
        let message: MessageRef = response
            .json()
            .await
            .context("failed to decode created message")?;
        debug!(channel = %destination_id, message_id = %message.id, "Created status message");
        Ok(message.id)
    }

    async fn update(
        &self,
        destination_id: &str,
        message_id: &str,
        payload: &RenderPayload,
    ) -> Result<(), DeliveryError> {
        let response = self
            .client
            .patch(self.message_url(destination_id, message_id))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&message_body(payload))
            .send()
            .await
            .context("failed to send edit message request")?;
        if !response.status().is_success() {
            return Err(failure(response, destination_id, message_id).await);
        }
        Ok(())
    }

    async fn confirm_exists(
        &self,
        destination_id: &str,
        message_id: &str,
    ) -> Result<bool, DeliveryError> {
        let response = self
            .client
            .get(self.message_url(destination_id, message_id))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .context("failed to send get message request")?;
        if response.status().is_success() {
            return Ok(true);
        }
        match failure(response, destination_id, message_id).await {
            DeliveryError::NotFound { .. } => Ok(false),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let delivery =
            DiscordDelivery::with_base_url("t0k3n", "http://localhost:1/api/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(delivery.messages_url("42"), "http://localhost:1/api/channels/42/messages");
        assert_eq!(
            delivery.message_url("42", "7"),
            "http://localhost:1/api/channels/42/messages/7"
        );
        assert_eq!(delivery.authorization(), "Bot t0k3n");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(classify(StatusCode::NOT_FOUND, "", "c", "m").is_not_found());
        assert!(
            classify(
                StatusCode::BAD_REQUEST,
                r#"{"message": "Unknown Message", "code": 10008}"#,
                "c",
                "m"
            )
            .is_not_found()
        );
        let err = classify(
            StatusCode::FORBIDDEN,
            r#"{"message": "Missing Access", "code": 50001}"#,
            "c",
            "m",
        );
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("Missing Access"));
    }
}

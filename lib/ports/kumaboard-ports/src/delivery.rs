use async_trait::async_trait;
use thiserror::Error;

use kumaboard_domain::RenderPayload;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The destination or message no longer exists upstream.
    #[error("message {message_id} not found in {destination_id}")]
    NotFound {
        destination_id: String,
        message_id: String,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeliveryError {
    pub fn not_found(destination_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        DeliveryError::NotFound {
            destination_id: destination_id.into(),
            message_id: message_id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DeliveryError::NotFound { .. })
    }
}

/// Posts and edits status summaries in a chat destination.
#[async_trait]
pub trait DeliveryPort: Send + Sync {
    /// Posts a new summary and returns the message id.
    async fn create(
        &self,
        destination_id: &str,
        payload: &RenderPayload,
    ) -> Result<String, DeliveryError>;

    async fn update(
        &self,
        destination_id: &str,
        message_id: &str,
        payload: &RenderPayload,
    ) -> Result<(), DeliveryError>;

    async fn confirm_exists(
        &self,
        destination_id: &str,
        message_id: &str,
    ) -> Result<bool, DeliveryError>;
}

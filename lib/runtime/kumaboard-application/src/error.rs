use thiserror::Error;

use kumaboard_domain::ParseError;
use kumaboard_ports::DeliveryError;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to fetch metrics: {0:#}")]
    Metrics(anyhow::Error),
    #[error("failed to parse metrics: {0}")]
    Parse(#[from] ParseError),
    #[error("failed to deliver status message: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("status registry error: {0:#}")]
    Registry(anyhow::Error),
}

impl ReconcileError {
    /// Short text suitable for an ephemeral reply to the requester.
    pub fn reply(&self) -> &'static str {
        match self {
            ReconcileError::Metrics(_) | ReconcileError::Parse(_) => {
                "Failed to fetch service statuses."
            }
            ReconcileError::Delivery(_) | ReconcileError::Registry(_) => {
                "Failed to update status message."
            }
        }
    }
}

//! Port traits between the reconciliation engine and its collaborators.

mod delivery;
mod memory;

pub use delivery::{DeliveryError, DeliveryPort};
pub use memory::InMemoryRegistry;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use kumaboard_domain::{RegistryEntry, ViewMode};

/// Source of raw exposition text.
#[async_trait]
pub trait MetricsPort: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// Durable destination -> message mapping.
///
/// Implementations serialize each operation behind one lock so that a
/// scheduled refresh and a user request cannot both insert a row for the
/// same destination.
#[async_trait]
pub trait RegistryPort: Send + Sync {
    /// Inserts a row for `destination_id`, or rewrites the existing one.
    async fn upsert(&self, destination_id: &str, message_id: &str, view_mode: ViewMode)
    -> Result<()>;

    async fn list_all(&self) -> Result<Vec<RegistryEntry>>;

    /// Deleting a row that is not there is not an error.
    async fn remove(&self, message_id: &str, destination_id: &str) -> Result<()>;

    async fn find(&self, destination_id: &str) -> Result<Option<RegistryEntry>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|entry| entry.destination_id == destination_id))
    }
}

#[derive(Clone)]
pub struct PortSet {
    pub metrics: Arc<dyn MetricsPort>,
    pub delivery: Arc<dyn DeliveryPort>,
    pub registry: Arc<dyn RegistryPort>,
}

use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use kumaboard_domain::{RegistryEntry, ViewMode};

use crate::RegistryPort;

/// Registry kept in process memory. Same semantics as the SQLite one,
/// minus durability.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    entries: Arc<Mutex<Vec<RegistryEntry>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<RegistryEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<RegistryEntry>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("registry lock poisoned"))
    }
}

#[async_trait]
impl RegistryPort for InMemoryRegistry {
    async fn upsert(
        &self,
        destination_id: &str,
        message_id: &str,
        view_mode: ViewMode,
    ) -> Result<()> {
        let mut entries = self.lock()?;
        if let Some(existing) = entries
            .iter_mut()
            .find(|entry| entry.destination_id == destination_id)
        {
            existing.message_id = message_id.to_string();
            existing.view_mode = view_mode;
        } else {
            entries.push(RegistryEntry::new(destination_id, message_id, view_mode));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<RegistryEntry>> {
        Ok(self.lock()?.clone())
    }

    async fn remove(&self, message_id: &str, destination_id: &str) -> Result<()> {
        self.lock()?.retain(|entry| {
            !(entry.message_id == message_id && entry.destination_id == destination_id)
        });
        Ok(())
    }
}

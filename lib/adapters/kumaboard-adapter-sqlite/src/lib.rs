//! SQLite-backed status registry.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::warn;

use kumaboard_domain::{RegistryEntry, ViewMode};
use kumaboard_ports::RegistryPort;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS status_message (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    view_type TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS status_message_channel ON status_message (channel_id);
";

/// Registry rows survive restarts. One connection behind one mutex, so
/// every operation is a critical section.
#[derive(Clone)]
pub struct SqliteRegistry {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRegistry {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open status database at {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().context("failed to open in-memory database")?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("failed to create status_message table")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| anyhow!("status database lock poisoned"))?;
            f(&mut guard)
        })
        .await
        .context("status database task failed")?
    }
}

fn view_mode_from_column(destination_id: &str, raw: &str) -> ViewMode {
    raw.parse().unwrap_or_else(|_| {
        warn!(destination = %destination_id, view = %raw, "Unknown stored view mode, using minimal");
        ViewMode::Minimal
    })
}

#[async_trait]
impl RegistryPort for SqliteRegistry {
    async fn upsert(
        &self,
        destination_id: &str,
        message_id: &str,
        view_mode: ViewMode,
    ) -> Result<()> {
        let destination_id = destination_id.to_string();
        let message_id = message_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM status_message WHERE channel_id = ?1)",
                params![destination_id],
                |row| row.get(0),
            )?;
            if exists {
                tx.execute(
                    "UPDATE status_message SET message_id = ?2, view_type = ?3 WHERE channel_id = ?1",
                    params![destination_id, message_id, view_mode.as_str()],
                )?;
            } else {
                tx.execute(
                    "INSERT INTO status_message (message_id, channel_id, view_type) VALUES (?1, ?2, ?3)",
                    params![message_id, destination_id, view_mode.as_str()],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .context("failed to store status entry")
    }

    async fn list_all(&self) -> Result<Vec<RegistryEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT message_id, channel_id, view_type FROM status_message ORDER BY id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            let mut entries = Vec::new();
            for row in rows {
                let (message_id, channel_id, view_type) = row?;
                let view_mode = view_mode_from_column(&channel_id, &view_type);
                entries.push(RegistryEntry::new(channel_id, message_id, view_mode));
            }
            Ok(entries)
        })
        .await
        .context("failed to list status entries")
    }

    async fn remove(&self, message_id: &str, destination_id: &str) -> Result<()> {
        let destination_id = destination_id.to_string();
        let message_id = message_id.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM status_message WHERE message_id = ?1 AND channel_id = ?2",
                params![message_id, destination_id],
            )?;
            Ok(())
        })
        .await
        .context("failed to delete status entry")
    }

    async fn find(&self, destination_id: &str) -> Result<Option<RegistryEntry>> {
        let destination_id = destination_id.to_string();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT message_id, view_type FROM status_message WHERE channel_id = ?1",
                    params![destination_id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()?;
            Ok(row.map(|(message_id, view_type)| {
                let view_mode = view_mode_from_column(&destination_id, &view_type);
                RegistryEntry::new(destination_id.clone(), message_id, view_mode)
            }))
        })
        .await
        .context("failed to look up status entry")
    }
}

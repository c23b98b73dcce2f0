use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use kumaboard_adapter_discord::DiscordDelivery;
use kumaboard_adapter_kuma::KumaClient;
use kumaboard_adapter_sqlite::SqliteRegistry;
use kumaboard_application::{RefreshScheduler, StatusReconciler};
use kumaboard_domain::KumaboardConfig;
use kumaboard_ports::PortSet;

/// Config, adapters, and engine wired together for one process.
pub struct KumaboardBackend {
    pub config: Arc<KumaboardConfig>,
    pub config_path: PathBuf,
    pub database_path: PathBuf,
    ports: PortSet,
    reconciler: Arc<StatusReconciler>,
}

impl KumaboardBackend {
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config = KumaboardConfig::load_from_path(config_path)?;
        Self::from_config(config, config_path)
    }

    pub fn from_config(config: KumaboardConfig, config_path: &Path) -> Result<Self> {
        let timeout = config.request_timeout();
        let metrics = KumaClient::new(&config.uptime_kuma, timeout)?;
        let delivery = DiscordDelivery::new(config.discord.token.clone(), timeout)?;
        let database_path = config.database_path(config_path);
        let registry = SqliteRegistry::open(&database_path).with_context(|| {
            format!(
                "failed to initialize status store at {}",
                database_path.display()
            )
        })?;

        let ports = PortSet {
            metrics: Arc::new(metrics),
            delivery: Arc::new(delivery),
            registry: Arc::new(registry),
        };
        Ok(Self::with_ports(config, config_path, database_path, ports))
    }

    pub fn with_ports(
        config: KumaboardConfig,
        config_path: &Path,
        database_path: PathBuf,
        ports: PortSet,
    ) -> Self {
        let reconciler = Arc::new(StatusReconciler::new(ports.clone(), config.catalog()));
        Self {
            config: Arc::new(config),
            config_path: config_path.to_path_buf(),
            database_path,
            ports,
            reconciler,
        }
    }

    pub fn reconciler(&self) -> Arc<StatusReconciler> {
        Arc::clone(&self.reconciler)
    }

    pub fn scheduler(&self) -> RefreshScheduler {
        RefreshScheduler::new(self.reconciler(), self.config.update_interval())
    }

    pub fn ports(&self) -> PortSet {
        self.ports.clone()
    }
}

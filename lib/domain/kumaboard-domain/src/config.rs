use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Section};

pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DATABASE_FILE: &str = "status.db";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    #[serde(default)]
    pub application_id: String,
    #[serde(default)]
    pub guild_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UptimeKumaConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: String,
}

impl UptimeKumaConfig {
    pub fn metrics_url(&self) -> String {
        format!("{}/metrics", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KumaboardConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    pub uptime_kuma: UptimeKumaConfig,
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Seconds between scheduled refreshes; 0 or absent means the default.
    #[serde(default)]
    pub update_interval: u64,
    /// Seconds before an outbound HTTP call is abandoned.
    #[serde(default)]
    pub request_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl KumaboardConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::from_yaml(&raw)
            .with_context(|| format!("failed to load config at {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw).context("invalid config yaml")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.uptime_kuma.base_url.trim().is_empty() {
            anyhow::bail!("uptime_kuma.base_url is required");
        }
        for section in &self.sections {
            if let Some(service) = section.services.iter().find(|s| s.name.trim().is_empty()) {
                anyhow::bail!(
                    "section {:?} has a service without a name (display_name: {:?})",
                    section.name,
                    service.display_name
                );
            }
        }
        Ok(())
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.sections.clone())
    }

    pub fn update_interval(&self) -> Duration {
        match self.update_interval {
            0 => Duration::from_secs(DEFAULT_UPDATE_INTERVAL_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout {
            0 => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Relative database paths resolve against the config file's directory.
    pub fn database_path(&self, config_path: &Path) -> PathBuf {
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        match &self.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => base.join(DEFAULT_DATABASE_FILE),
        }
    }
}

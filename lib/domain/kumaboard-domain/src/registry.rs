use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How much detail a posted status summary carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Minimal,
    Detailed,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Minimal => "minimal",
            ViewMode::Detailed => "detailed",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(ViewMode::Minimal),
            "detailed" => Ok(ViewMode::Detailed),
            other => anyhow::bail!("unknown view mode: {other}"),
        }
    }
}

/// Which message currently represents a destination's status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub destination_id: String,
    pub message_id: String,
    pub view_mode: ViewMode,
}

impl RegistryEntry {
    pub fn new(
        destination_id: impl Into<String>,
        message_id: impl Into<String>,
        view_mode: ViewMode,
    ) -> Self {
        Self {
            destination_id: destination_id.into(),
            message_id: message_id.into(),
            view_mode,
        }
    }
}

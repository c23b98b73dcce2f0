use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

pub const STATUS_TITLE: &str = "Service Status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedColor {
    Red,
    Yellow,
    Blue,
    Green,
}

impl EmbedColor {
    pub fn for_worst(severity: Severity) -> Self {
        match severity {
            Severity::Down => EmbedColor::Red,
            Severity::Pending => EmbedColor::Yellow,
            Severity::Maintenance => EmbedColor::Blue,
            Severity::Up | Severity::Unknown(_) => EmbedColor::Green,
        }
    }

    pub fn rgb(self) -> u32 {
        match self {
            EmbedColor::Red => 0xff0000,
            EmbedColor::Yellow => 0xffff00,
            EmbedColor::Blue => 0x0000ff,
            EmbedColor::Green => 0x00ff00,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderField {
    pub name: String,
    pub body: String,
}

impl RenderField {
    pub fn header(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: String::new(),
        }
    }
}

/// Channel-agnostic status summary. Rebuilt every cycle, never diffed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPayload {
    pub title: String,
    pub color: EmbedColor,
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<RenderField>,
}

//! Domain models and invariants.

pub mod catalog;
pub mod config;
pub mod exposition;
pub mod registry;
pub mod render;
pub mod severity;
pub mod status;

pub use catalog::{Catalog, Section, ServiceEntry};
pub use config::{DiscordConfig, KumaboardConfig, UptimeKumaConfig};
pub use exposition::{LineIssue, LineIssueKind, ParseError, ParseReport, parse_metrics, parse_report};
pub use registry::{RegistryEntry, ViewMode};
pub use render::{EmbedColor, RenderField, RenderPayload};
pub use severity::Severity;
pub use status::{ServiceStatus, ServiceStatuses};

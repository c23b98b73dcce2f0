//! Uptime Kuma status summaries for Discord channels.

pub mod backend;
pub mod config_path;

pub use backend::KumaboardBackend;

//! Locates the config file when none is given explicitly.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;

pub const CONFIG_FILE: &str = "config.yaml";

/// Explicit path, then `~/.config/kumaboard/config.yaml` if present, then
/// `config.yaml` beside the executable.
pub fn resolve(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    if let Some(path) = home_config(env::var("HOME").ok().as_deref()) {
        if path.exists() {
            return Ok(path);
        }
    }

    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            return Ok(dir.join(CONFIG_FILE));
        }
    }

    anyhow::bail!(
        "no config file found. Specify one with --config or place it in \
         ~/.config/kumaboard/config.yaml or next to the executable"
    )
}

fn home_config(home: Option<&str>) -> Option<PathBuf> {
    home.filter(|home| !home.is_empty())
        .map(|home| Path::new(home).join(".config").join("kumaboard").join(CONFIG_FILE))
}

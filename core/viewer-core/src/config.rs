//! Switch preferences.
//!
//! Preferences are read once per switch through a [`ConfigSource`]; nothing
//! here caches between calls, so an edited `config.json` applies to the next
//! click.

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};
use crate::storage::atomic_write;

fn default_restart_packages() -> Vec<String> {
    vec!["linter".to_string()]
}

/// Preferences consulted by the workspace switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchConfig {
    /// Open projects in a new window by default (inverted by the modifier).
    #[serde(default)]
    pub open_new_window: bool,
    /// Keep the current panes on switch instead of saving/restoring per-project state.
    #[serde(default)]
    pub keep_context: bool,
    /// Host packages restarted after an in-window switch.
    #[serde(default = "default_restart_packages")]
    pub restart_packages: Vec<String>,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            open_new_window: false,
            keep_context: false,
            restart_packages: default_restart_packages(),
        }
    }
}

/// Where the switcher gets its preferences from on each call.
pub trait ConfigSource {
    fn snapshot(&self) -> SwitchConfig;
}

impl ConfigSource for SwitchConfig {
    fn snapshot(&self) -> SwitchConfig {
        self.clone()
    }
}

/// Reads `config.json` on every snapshot, falling back to defaults when the
/// file is missing or malformed.
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, config: &SwitchConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config).map_err(|e| ViewerError::Json {
            context: "serializing switch config".to_string(),
            source: e,
        })?;
        atomic_write(&self.path, &content)
    }
}

impl ConfigSource for FileConfig {
    fn snapshot(&self) -> SwitchConfig {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return SwitchConfig::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Malformed config, using defaults"
            );
            SwitchConfig::default()
        })
    }
}

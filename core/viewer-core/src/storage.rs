//! Storage configuration and path management for project-viewer.
//!
//! All file locations are decided here so tests can point the whole crate at
//! a temp directory with [`StorageConfig::with_root`].

use fs_err as fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{Result, ViewerError};

/// Central configuration for all project-viewer storage paths.
///
/// Production code uses `StorageConfig::default()` which points to
/// `~/.project-viewer/`.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let root = dirs::home_dir()
            .map(|home| home.join(".project-viewer"))
            .unwrap_or_else(|| std::env::temp_dir().join("project-viewer"));
        Self { root }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to projects.json (the persisted project tree).
    pub fn projects_file(&self) -> PathBuf {
        self.root.join("projects.json")
    }

    /// Path to config.json (switch preferences).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Directories
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to states/ directory (serialized workspace states, one file per key).
    pub fn states_dir(&self) -> PathBuf {
        self.root.join("states")
    }

    /// Path to logs/ directory.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Path to the saved state for a state key.
    /// Example: ~/.project-viewer/states/editor-5d41402abc4b2a76b9719d911017c592.json
    pub fn state_file(&self, key: &str) -> PathBuf {
        self.states_dir().join(format!("{}.json", sanitize_key(key)))
    }
}

/// Keeps a state key usable as a single file name.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

/// Writes `contents` to `path` via a temp file in the same directory, then renames.
pub(crate) fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    fs::create_dir_all(dir).map_err(|e| ViewerError::Io {
        context: format!("creating directory {}", dir.display()),
        source: e,
    })?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ViewerError::Io {
        context: format!("creating temp file in {}", dir.display()),
        source: e,
    })?;

    tmp.write_all(contents.as_bytes())
        .map_err(|e| ViewerError::Io {
            context: format!("writing temp file for {}", path.display()),
            source: e,
        })?;

    tmp.flush().map_err(|e| ViewerError::Io {
        context: format!("flushing temp file for {}", path.display()),
        source: e,
    })?;

    tmp.persist(path).map_err(|e| ViewerError::Io {
        context: format!("persisting temp file to {}", path.display()),
        source: e.error,
    })?;

    Ok(())
}

//! File-backed project tree store.
//!
//! Holds the ordered tree in memory and writes it to `projects.json` only when
//! [`ProjectStore::persist`] is called. [`ProjectStore::move_node`] never
//! touches disk, so several moves can be batched and tests can move nodes
//! without side effects.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "roots": [ { "uuid": "01J...", "name": "Work", "paths": [], "children": [...] } ]
//! }
//! ```
//!
//! Loading is defensive: a missing, empty, corrupt or wrong-version file
//! yields an empty store bound to the same path (with a warning) instead of
//! an error.

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};
use crate::storage::atomic_write;
use crate::tree::{NodeId, ProjectNode, ProjectTree};

pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(flatten)]
    tree: ProjectTree,
}

/// In-memory project tree, optionally backed by a file.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    tree: ProjectTree,
    file_path: Option<PathBuf>,
}

impl ProjectStore {
    pub fn new_in_memory(tree: ProjectTree) -> Self {
        ProjectStore {
            tree,
            file_path: None,
        }
    }

    pub fn new(file_path: &Path, tree: ProjectTree) -> Self {
        ProjectStore {
            tree,
            file_path: Some(file_path.to_path_buf()),
        }
    }

    pub fn load(file_path: &Path) -> Self {
        let empty = || ProjectStore::new(file_path, ProjectTree::default());

        if !file_path.exists() {
            return empty();
        }

        let content = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read project file, starting empty");
                return empty();
            }
        };

        if content.trim().is_empty() {
            tracing::warn!(path = %file_path.display(), "Empty project file, starting empty");
            return empty();
        }

        match serde_json::from_str::<StoreFile>(&content) {
            Ok(file) if file.version == STORE_VERSION => ProjectStore::new(file_path, file.tree),
            Ok(file) => {
                let err = ViewerError::UnsupportedVersion {
                    path: file_path.to_path_buf(),
                    found: file.version,
                    expected: STORE_VERSION,
                };
                tracing::warn!(error = %err, "Ignoring project file");
                empty()
            }
            Err(e) => {
                tracing::warn!(
                    path = %file_path.display(),
                    error = %e,
                    "Failed to parse project file, starting empty"
                );
                empty()
            }
        }
    }

    pub fn tree(&self) -> &ProjectTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ProjectTree {
        &mut self.tree
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn find(&self, id: &NodeId) -> Option<&ProjectNode> {
        self.tree.find(id)
    }

    /// Relocates `dragged` before or after `target`. In-memory only.
    pub fn move_node(
        &mut self,
        dragged: &NodeId,
        target: &NodeId,
        insert_before: bool,
    ) -> Result<()> {
        self.tree.move_node(dragged, target, insert_before)?;
        tracing::debug!(
            dragged = %dragged,
            target = %target,
            insert_before,
            "Moved project node"
        );
        Ok(())
    }

    /// Writes the current tree to the backing file.
    ///
    /// A failure leaves the in-memory tree as it is.
    pub fn persist(&self) -> Result<()> {
        let file_path = self.file_path.as_ref().ok_or(ViewerError::NoBackingFile)?;

        let file = StoreFile {
            version: STORE_VERSION,
            tree: self.tree.clone(),
        };
        let content = serde_json::to_string_pretty(&file).map_err(|e| ViewerError::Json {
            context: "serializing project tree".to_string(),
            source: e,
        })?;

        atomic_write(file_path, &content)
    }
}

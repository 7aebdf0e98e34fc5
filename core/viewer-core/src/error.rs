//! Error types for viewer-core operations.
//!
//! Nothing in this crate is fatal to the host: callers at the protocol edges
//! (reorder engine, workspace switcher) turn these into log lines and
//! best-effort fallbacks instead of propagating them.

use std::path::PathBuf;

use crate::tree::NodeId;

// ═══════════════════════════════════════════════════════════════════════════════
// Core Error
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors that can occur in viewer-core operations.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    // ─────────────────────────────────────────────────────────────────────
    // Tree Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Project node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Cannot move {dragged} relative to {target}: {reason}")]
    InvalidMove {
        dragged: NodeId,
        target: NodeId,
        reason: &'static str,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Persistence Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Store has no backing file (in-memory store)")]
    NoBackingFile,

    #[error("Unsupported file version {found} in {path} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using ViewerError.
pub type Result<T> = std::result::Result<T, ViewerError>;

impl From<ViewerError> for String {
    fn from(err: ViewerError) -> String {
        err.to_string()
    }
}

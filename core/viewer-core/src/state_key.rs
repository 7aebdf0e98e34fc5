//! Deterministic keys for saved workspace states.
//!
//! A key is derived from the ordered path set only, so the same set in the
//! same order always finds the state saved for it. Paths are never sorted
//! here; a reordered set is a different workspace as far as keys go.

pub const STATE_KEY_PREFIX: &str = "editor-";

/// Returns `editor-<md5 hex of the paths joined by newlines>`, or `None` for
/// an empty path set (there is no workspace to key).
pub fn state_key<S: AsRef<str>>(paths: &[S]) -> Option<String> {
    if paths.is_empty() {
        return None;
    }
    let joined = paths
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    Some(format!("{}{:x}", STATE_KEY_PREFIX, md5::compute(joined)))
}

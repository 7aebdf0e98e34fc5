//! Project activation: switching the current window to a project's paths.
//!
//! ## Flow of [`WorkspaceSwitcher::open`]
//!
//! ```text
//! no paths ────────────────────────────────► NoPaths
//! new window (config, inverted by modifier) ─► OpenedNewWindow
//! already the open project ─────────────────► AlreadyOpen
//! select node
//! keep_context = false: save current state under key(active paths)
//! status ◄─ breadcrumb
//! keep_context = false:
//!     saved state for key(node paths)? ── yes ─► deserialize
//!                                      └─ no ──► set paths (flagged), destroy pane
//! restart packages ─────────────────────────► Switched
//! ```
//!
//! Saving and loading are best effort: a storage error is logged and the
//! switch falls back to a plain path switch.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::SwitchConfig;
use crate::host::{WindowRequest, WorkspaceHost};
use crate::states::StateStorage;
use crate::tree::{NodeId, ProjectNode, ProjectTree};
use crate::view::ViewRegistry;

// ═══════════════════════════════════════════════════════════════════════════════
// Reentrancy Flag
// ═══════════════════════════════════════════════════════════════════════════════

/// Set while the switcher itself is changing the host's path set.
///
/// Path-change listeners hold a clone and ignore changes seen while it is set,
/// so a switch cannot re-trigger itself.
#[derive(Debug, Clone, Default)]
pub struct SwitchFlag(Arc<AtomicBool>);

impl SwitchFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sets the flag until the returned guard is dropped.
    pub fn begin(&self) -> SwitchGuard {
        self.0.store(true, Ordering::SeqCst);
        SwitchGuard(self.0.clone())
    }
}

pub struct SwitchGuard(Arc<AtomicBool>);

impl Drop for SwitchGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Outcome
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    UnknownNode,
    /// Group node; nothing to open.
    NoPaths,
    /// Handed to a new window; the current window's selection is untouched.
    OpenedNewWindow,
    AlreadyOpen,
    /// The current window now shows the project. `restored` is true when a
    /// saved state was deserialized.
    Switched { restored: bool },
}

impl SwitchOutcome {
    pub fn is_switched(self) -> bool {
        matches!(self, SwitchOutcome::Switched { .. })
    }
}

/// Compares path sets ignoring order and duplicates. An empty set never matches.
pub fn same_path_set(a: &[String], b: &[String]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a: BTreeSet<&str> = a.iter().map(String::as_str).collect();
    let b: BTreeSet<&str> = b.iter().map(String::as_str).collect();
    a == b
}

// ═══════════════════════════════════════════════════════════════════════════════
// Switcher
// ═══════════════════════════════════════════════════════════════════════════════

pub struct WorkspaceSwitcher<H, S> {
    host: H,
    storage: S,
    flag: SwitchFlag,
}

impl<H: WorkspaceHost, S: StateStorage> WorkspaceSwitcher<H, S> {
    pub fn new(host: H, storage: S) -> Self {
        Self {
            host,
            storage,
            flag: SwitchFlag::default(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// A handle on the reentrancy flag for path-change listeners.
    pub fn switch_flag(&self) -> SwitchFlag {
        self.flag.clone()
    }

    pub fn is_switch_in_progress(&self) -> bool {
        self.flag.is_set()
    }

    /// Whether `node` is the project shown in the current window.
    pub fn is_currently_open(&self, node: &ProjectNode) -> bool {
        same_path_set(&node.paths, &self.host.active_paths())
    }

    pub fn open(
        &mut self,
        tree: &ProjectTree,
        views: &mut ViewRegistry,
        id: &NodeId,
        reverse_modifier: bool,
        config: &SwitchConfig,
    ) -> SwitchOutcome {
        let Some(node) = tree.find(id) else {
            return SwitchOutcome::UnknownNode;
        };

        if node.paths.is_empty() {
            return SwitchOutcome::NoPaths;
        }

        let open_in_new_window = if reverse_modifier {
            !config.open_new_window
        } else {
            config.open_new_window
        };

        if open_in_new_window {
            tracing::debug!(node = %id, "Opening project in new window");
            self.host.open_new_window(WindowRequest {
                paths: node.paths.clone(),
                dev_mode: node.dev_mode,
                safe_mode: false,
            });
            return SwitchOutcome::OpenedNewWindow;
        }

        if self.is_currently_open(node) {
            return SwitchOutcome::AlreadyOpen;
        }

        views.select(id);

        if !config.keep_context {
            self.save_current_state();
        }

        let breadcrumb = tree.breadcrumb(id).unwrap_or_else(|| node.name.clone());
        self.host.update_status(&breadcrumb);

        let restored = if config.keep_context {
            false
        } else {
            self.restore_or_switch(&node.paths)
        };

        for package in &config.restart_packages {
            if self.host.restart_package(package) {
                tracing::debug!(package = %package, "Restarted package after switch");
            }
        }

        tracing::info!(
            node = %id,
            restored,
            keep_context = config.keep_context,
            "Switched project"
        );
        SwitchOutcome::Switched { restored }
    }

    fn save_current_state(&mut self) {
        let active = self.host.active_paths();
        let Some(key) = self.host.state_key(&active) else {
            return;
        };
        let Some(blob) = self.host.serialize_state() else {
            return;
        };
        if let Err(err) = self.storage.store_state(&key, &blob) {
            tracing::warn!(key = %key, error = %err, "Failed to save workspace state");
        }
    }

    /// Restores the saved state for `paths`, or switches to them fresh.
    /// Returns true when a saved state was restored.
    fn restore_or_switch(&mut self, paths: &[String]) -> bool {
        let saved = self.host.state_key(paths).and_then(|key| {
            self.storage.load_state(&key).unwrap_or_else(|err| {
                tracing::warn!(key = %key, error = %err, "Failed to load workspace state");
                None
            })
        });

        match saved {
            Some(blob) => {
                self.host.deserialize_state(&blob);
                true
            }
            None => {
                {
                    let _guard = self.flag.begin();
                    self.host.set_active_paths(paths);
                }
                self.host.destroy_active_pane();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ViewerError};
    use crate::host::{HostCall, RecordingHost};
    use crate::state_key::state_key;
    use crate::states::MemoryStateStorage;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn tree() -> ProjectTree {
        ProjectTree::new(vec![
            ProjectNode::project("Alpha", paths(&["/alpha"])).with_uuid("alpha"),
            ProjectNode::group("Clients")
                .with_uuid("clients")
                .with_children(vec![ProjectNode::project("Beta", paths(&["/beta", "/beta-docs"]))
                    .with_uuid("beta")
                    .with_dev_mode(true)]),
        ])
    }

    fn setup(
        active: &[&str],
    ) -> (
        WorkspaceSwitcher<RecordingHost, MemoryStateStorage>,
        ViewRegistry,
    ) {
        let mut views = ViewRegistry::new();
        tree().walk(|node, _| {
            views.attach(node);
        });
        let host = RecordingHost::new(paths(active)).with_packages(&["linter"]);
        let mut switcher = WorkspaceSwitcher::new(host, MemoryStateStorage::new());
        let flag = switcher.switch_flag();
        switcher.host_mut().observe_switch_flag(flag);
        (switcher, views)
    }

    fn no_context() -> SwitchConfig {
        SwitchConfig::default()
    }

    struct FailingStorage;

    impl StateStorage for FailingStorage {
        fn store_state(&mut self, _key: &str, _blob: &str) -> Result<()> {
            Err(ViewerError::NoBackingFile)
        }

        fn load_state(&self, _key: &str) -> Result<Option<String>> {
            Err(ViewerError::NoBackingFile)
        }
    }

    #[test]
    fn test_group_without_paths_is_not_opened() {
        let (mut switcher, mut views) = setup(&["/alpha"]);
        let outcome = switcher.open(&tree(), &mut views, &"clients".into(), false, &no_context());
        assert_eq!(outcome, SwitchOutcome::NoPaths);
        assert!(!outcome.is_switched());
        assert!(switcher.host().calls().is_empty());
    }

    #[test]
    fn test_unknown_node_is_noop() {
        let (mut switcher, mut views) = setup(&["/alpha"]);
        let outcome = switcher.open(&tree(), &mut views, &"ghost".into(), false, &no_context());
        assert_eq!(outcome, SwitchOutcome::UnknownNode);
        assert!(switcher.host().calls().is_empty());
    }

    #[test]
    fn test_modifier_inverts_configured_new_window() {
        let (mut switcher, mut views) = setup(&["/alpha"]);
        let outcome = switcher.open(&tree(), &mut views, &"beta".into(), true, &no_context());
        assert_eq!(outcome, SwitchOutcome::OpenedNewWindow);
        assert_eq!(
            switcher.host().calls(),
            &[HostCall::OpenNewWindow(WindowRequest {
                paths: paths(&["/beta", "/beta-docs"]),
                dev_mode: true,
                safe_mode: false,
            })]
        );
        assert_eq!(views.selected(), None, "new window leaves selection alone");

        let (mut switcher, mut views) = setup(&["/alpha"]);
        let config = SwitchConfig {
            open_new_window: true,
            ..SwitchConfig::default()
        };
        let outcome = switcher.open(&tree(), &mut views, &"beta".into(), true, &config);
        assert!(outcome.is_switched());
        assert!(!matches!(switcher.host().calls()[0], HostCall::OpenNewWindow(_)));
    }

    #[test]
    fn test_configured_new_window_without_modifier() {
        let (mut switcher, mut views) = setup(&["/alpha"]);
        let config = SwitchConfig {
            open_new_window: true,
            ..SwitchConfig::default()
        };
        let outcome = switcher.open(&tree(), &mut views, &"alpha".into(), false, &config);
        assert_eq!(outcome, SwitchOutcome::OpenedNewWindow);
    }

    #[test]
    fn test_already_open_project_is_noop() {
        let (mut switcher, mut views) = setup(&["/beta-docs", "/beta"]);
        let outcome = switcher.open(&tree(), &mut views, &"beta".into(), false, &no_context());
        assert_eq!(outcome, SwitchOutcome::AlreadyOpen);
        assert!(switcher.host().calls().is_empty());
    }

    #[test]
    fn test_fresh_switch_saves_then_sets_paths_under_flag() {
        let (mut switcher, mut views) = setup(&["/alpha"]);
        let outcome = switcher.open(&tree(), &mut views, &"beta".into(), false, &no_context());

        assert_eq!(outcome, SwitchOutcome::Switched { restored: false });
        assert_eq!(views.selected(), Some(&NodeId::from("beta")));

        let calls = switcher.host().calls();
        assert_eq!(calls[0], HostCall::SerializeState);
        assert_eq!(calls[1], HostCall::UpdateStatus("Clients / Beta".into()));
        assert_eq!(
            calls[2],
            HostCall::SetActivePaths {
                paths: paths(&["/beta", "/beta-docs"]),
                switch_in_progress: true,
            }
        );
        assert_eq!(calls[3], HostCall::DestroyActivePane);
        assert_eq!(calls[4], HostCall::RestartPackage("linter".into()));
        assert_eq!(calls.len(), 5);

        assert!(!switcher.is_switch_in_progress());
        let alpha_key = state_key(&["/alpha"]).unwrap();
        assert!(switcher.storage().get(&alpha_key).is_some());
    }

    #[test]
    fn test_switching_back_restores_saved_state() {
        let (mut switcher, mut views) = setup(&["/alpha"]);
        switcher.host_mut().set_panes(4);
        switcher.open(&tree(), &mut views, &"beta".into(), false, &no_context());
        switcher.host_mut().take_calls();

        let outcome = switcher.open(&tree(), &mut views, &"alpha".into(), false, &no_context());
        assert_eq!(outcome, SwitchOutcome::Switched { restored: true });
        assert_eq!(switcher.host().active_paths(), vec!["/alpha"]);
        assert_eq!(switcher.host().panes(), 4);

        let calls = switcher.host().calls();
        assert!(calls.iter().any(|c| matches!(c, HostCall::DeserializeState(_))));
        assert!(!calls.iter().any(|c| matches!(c, HostCall::SetActivePaths { .. })));
        assert!(!calls.contains(&HostCall::DestroyActivePane));
    }

    #[test]
    fn test_keep_context_never_touches_paths_or_panes() {
        let (mut switcher, mut views) = setup(&["/alpha"]);
        let config = SwitchConfig {
            keep_context: true,
            ..SwitchConfig::default()
        };
        let outcome = switcher.open(&tree(), &mut views, &"beta".into(), false, &config);

        assert_eq!(outcome, SwitchOutcome::Switched { restored: false });
        let calls = switcher.host().calls();
        assert_eq!(
            calls,
            &[
                HostCall::UpdateStatus("Clients / Beta".into()),
                HostCall::RestartPackage("linter".into()),
            ]
        );
        assert!(switcher.storage().is_empty());
    }

    #[test]
    fn test_storage_failures_fall_back_to_fresh_switch() {
        let tree = tree();
        let mut views = ViewRegistry::new();
        let host = RecordingHost::new(paths(&["/alpha"]));
        let mut switcher = WorkspaceSwitcher::new(host, FailingStorage);

        let outcome = switcher.open(&tree, &mut views, &"beta".into(), false, &no_context());
        assert_eq!(outcome, SwitchOutcome::Switched { restored: false });
        assert!(switcher
            .host()
            .calls()
            .iter()
            .any(|c| matches!(c, HostCall::SetActivePaths { .. })));
        assert!(switcher.host().calls().contains(&HostCall::DestroyActivePane));
    }

    #[test]
    fn test_no_active_project_skips_save() {
        let (mut switcher, mut views) = setup(&[]);
        switcher.open(&tree(), &mut views, &"alpha".into(), false, &no_context());
        assert!(!switcher.host().calls().contains(&HostCall::SerializeState));
        assert!(switcher.storage().is_empty());
    }

    #[test]
    fn test_flag_guard_resets() {
        let flag = SwitchFlag::default();
        {
            let _guard = flag.begin();
            assert!(flag.is_set());
        }
        assert!(!flag.is_set());
    }

    #[test]
    fn test_same_path_set() {
        assert!(same_path_set(&paths(&["/a", "/b"]), &paths(&["/b", "/a"])));
        assert!(!same_path_set(&paths(&["/a"]), &paths(&["/a", "/b"])));
        assert!(!same_path_set(&[], &[]));
    }
}

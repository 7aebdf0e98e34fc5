//! Integration tests for project switching with file-backed config and states.

use tempfile::TempDir;
use viewer_core::{
    state_key, FileConfig, FileStateStorage, HostCall, NodeId, ProjectNode, ProjectStore,
    ProjectTree, ProjectViewer, RecordingHost, StateStorage, StorageConfig, SwitchConfig,
    SwitchOutcome, ViewEvent, WorkspaceHost,
};

type Viewer = ProjectViewer<RecordingHost, FileStateStorage>;

fn tree() -> ProjectTree {
    ProjectTree::new(vec![
        ProjectNode::project("Web", vec!["/src/web".into(), "/src/shared".into()]).with_uuid("web"),
        ProjectNode::group("Tools").with_uuid("tools").with_children(vec![
            ProjectNode::project("Cli", vec!["/src/cli".into()])
                .with_uuid("cli")
                .with_dev_mode(true),
        ]),
    ])
}

fn viewer(storage: &StorageConfig, active: &[&str]) -> Viewer {
    let host = RecordingHost::new(active.iter().map(|s| s.to_string()).collect())
        .with_packages(&["linter"]);
    let mut viewer = ProjectViewer::new(
        ProjectStore::new_in_memory(tree()),
        host,
        FileStateStorage::new(storage.clone()),
        FileConfig::new(storage.config_file()),
    );
    let flag = viewer.switch_flag();
    viewer.switcher_mut().host_mut().observe_switch_flag(flag);
    viewer
}

fn click(viewer: &mut Viewer, node: &str, reverse_modifier: bool) -> SwitchOutcome {
    viewer
        .dispatch(ViewEvent::Click {
            node: NodeId::from(node),
            reverse_modifier,
        })
        .switch
        .unwrap()
}

fn write_config(storage: &StorageConfig, config: SwitchConfig) {
    FileConfig::new(storage.config_file()).save(&config).unwrap();
}

#[test]
fn test_round_trip_between_projects_restores_layout() {
    let temp = TempDir::new().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let mut viewer = viewer(&storage, &["/src/web", "/src/shared"]);
    viewer.switcher_mut().host_mut().set_panes(5);

    assert_eq!(click(&mut viewer, "cli", false), SwitchOutcome::Switched { restored: false });
    assert_eq!(viewer.switcher().host().active_paths(), vec!["/src/cli"]);

    let web_key = state_key(&["/src/web", "/src/shared"]).unwrap();
    assert!(storage.state_file(&web_key).exists());

    assert_eq!(click(&mut viewer, "web", false), SwitchOutcome::Switched { restored: true });
    assert_eq!(
        viewer.switcher().host().active_paths(),
        vec!["/src/web", "/src/shared"]
    );
    assert_eq!(viewer.switcher().host().panes(), 5);
    assert_eq!(viewer.views().selected(), Some(&NodeId::from("web")));
}

#[test]
fn test_fresh_switch_sets_paths_with_flag_raised() {
    let temp = TempDir::new().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let mut viewer = viewer(&storage, &["/src/web", "/src/shared"]);

    click(&mut viewer, "cli", false);

    let set_calls: Vec<_> = viewer
        .switcher()
        .host()
        .calls()
        .iter()
        .filter_map(|c| match c {
            HostCall::SetActivePaths {
                switch_in_progress, ..
            } => Some(*switch_in_progress),
            _ => None,
        })
        .collect();
    assert_eq!(set_calls, vec![true]);
    assert!(!viewer.switch_flag().is_set());
    assert!(viewer
        .switcher()
        .host()
        .calls()
        .contains(&HostCall::UpdateStatus("Tools / Cli".into())));
}

#[test]
fn test_modifier_inverts_config_read_per_click() {
    let temp = TempDir::new().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let mut viewer = viewer(&storage, &["/src/web", "/src/shared"]);

    assert_eq!(click(&mut viewer, "cli", true), SwitchOutcome::OpenedNewWindow);

    write_config(
        &storage,
        SwitchConfig {
            open_new_window: true,
            ..SwitchConfig::default()
        },
    );
    assert_eq!(click(&mut viewer, "cli", false), SwitchOutcome::OpenedNewWindow);
    assert!(click(&mut viewer, "cli", true).is_switched());
}

#[test]
fn test_keep_context_switch_leaves_paths_and_states_alone() {
    let temp = TempDir::new().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    write_config(
        &storage,
        SwitchConfig {
            keep_context: true,
            ..SwitchConfig::default()
        },
    );
    let mut viewer = viewer(&storage, &["/src/web", "/src/shared"]);

    assert!(click(&mut viewer, "cli", false).is_switched());

    let calls = viewer.switcher().host().calls();
    assert!(!calls.iter().any(|c| matches!(
        c,
        HostCall::SetActivePaths { .. } | HostCall::DestroyActivePane | HostCall::SerializeState
    )));
    assert!(FileStateStorage::new(storage.clone()).list().unwrap().is_empty());
}

#[test]
fn test_group_click_is_noop() {
    let temp = TempDir::new().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let mut viewer = viewer(&storage, &["/src/web", "/src/shared"]);

    assert_eq!(click(&mut viewer, "tools", false), SwitchOutcome::NoPaths);
    assert!(viewer.switcher().host().calls().is_empty());
}

#[test]
fn test_corrupt_saved_state_falls_back_to_fresh_switch() {
    let temp = TempDir::new().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let cli_key = state_key(&["/src/cli"]).unwrap();
    std::fs::create_dir_all(storage.states_dir()).unwrap();
    std::fs::write(storage.state_file(&cli_key), "{broken").unwrap();

    let mut viewer = viewer(&storage, &["/src/web", "/src/shared"]);
    assert_eq!(click(&mut viewer, "cli", false), SwitchOutcome::Switched { restored: false });
    assert_eq!(viewer.switcher().host().active_paths(), vec!["/src/cli"]);

    // the broken file is replaced the next time we leave the project
    click(&mut viewer, "web", false);
    let states = FileStateStorage::new(storage.clone());
    assert!(states.load_state(&cli_key).unwrap().is_some());
}

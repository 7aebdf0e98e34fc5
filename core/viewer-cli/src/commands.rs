//! Subcommand implementations. Each returns the text to print on success.

use std::fmt::Write as _;

use viewer_core::{
    state_key, DropOutcome, FileConfig, FileStateStorage, HostCall, NodeId, ProjectStore,
    ProjectViewer, RecordingHost, StorageConfig, ViewBounds, ViewEvent,
};

type Viewer = ProjectViewer<RecordingHost, FileStateStorage>;

fn load_viewer(storage: &StorageConfig, active: Vec<String>) -> Viewer {
    let store = ProjectStore::load(&storage.projects_file());
    let mut viewer = ProjectViewer::new(
        store,
        RecordingHost::new(active),
        FileStateStorage::new(storage.clone()),
        FileConfig::new(storage.config_file()),
    );
    let flag = viewer.switch_flag();
    viewer.switcher_mut().host_mut().observe_switch_flag(flag);
    viewer
}

fn require_node(viewer: &Viewer, id: &NodeId) -> Result<(), String> {
    if viewer.store().find(id).is_none() {
        return Err(format!("no project or group with uuid {}", id));
    }
    Ok(())
}

fn describe_calls(calls: &[HostCall], out: &mut String) {
    for call in calls {
        let line = match call {
            HostCall::OpenNewWindow(request) => format!(
                "open new window: {} (dev mode: {})",
                request.paths.join(", "),
                request.dev_mode
            ),
            HostCall::SerializeState => "serialize window state".to_string(),
            HostCall::DeserializeState(_) => "restore saved window state".to_string(),
            HostCall::SetActivePaths { paths, .. } => {
                format!("set project paths: {}", paths.join(", "))
            }
            HostCall::DestroyActivePane => "close active pane".to_string(),
            HostCall::UpdateStatus(text) => format!("status bar: {}", text),
            HostCall::RestartPackage(name) => format!("restart package: {}", name),
        };
        let _ = writeln!(out, "  {}", line);
    }
}

pub fn list(storage: &StorageConfig, active: Vec<String>) -> Result<String, String> {
    let mut viewer = load_viewer(storage, active);
    viewer.render_all();

    let mut out = String::new();
    if viewer.store().tree().is_empty() {
        let _ = writeln!(out, "No projects in {}", storage.projects_file().display());
        return Ok(out);
    }

    viewer.store().tree().walk(|node, depth| {
        let markers = viewer
            .views()
            .get(&node.uuid)
            .map(|view| view.markers)
            .unwrap_or_default();
        let flag = if markers.selected {
            '*'
        } else if markers.no_paths {
            '-'
        } else {
            ' '
        };
        let _ = write!(
            out,
            "{} {}{}  [{}]",
            flag,
            "  ".repeat(depth),
            node.name,
            node.uuid
        );
        if !node.paths.is_empty() {
            let _ = write!(out, "  {}", node.paths.join(", "));
        }
        out.push('\n');
    });
    Ok(out)
}

pub fn move_node(
    storage: &StorageConfig,
    dragged: &str,
    target: &str,
    before: bool,
) -> Result<String, String> {
    let mut store = ProjectStore::load(&storage.projects_file());
    let (dragged, target) = (NodeId::from(dragged), NodeId::from(target));
    store.move_node(&dragged, &target, before)?;
    store.persist()?;
    Ok(format!(
        "Moved {} {} {}\n",
        dragged,
        if before { "before" } else { "after" },
        target
    ))
}

pub fn drag(
    storage: &StorageConfig,
    dragged: &str,
    target: &str,
    pointer_y: f64,
    top: f64,
    height: f64,
) -> Result<String, String> {
    let mut viewer = load_viewer(storage, Vec::new());
    let (dragged, target) = (NodeId::from(dragged), NodeId::from(target));
    require_node(&viewer, &dragged)?;
    require_node(&viewer, &target)?;
    viewer.set_bounds(&target, ViewBounds::new(top, height));

    viewer.dispatch(ViewEvent::DragStart {
        node: dragged.clone(),
    });
    viewer.dispatch(ViewEvent::DragEnter {
        node: target.clone(),
    });
    let hover = viewer
        .dispatch(ViewEvent::DragOver {
            node: target.clone(),
            pointer_y,
        })
        .hover;
    let outcome = viewer
        .dispatch(ViewEvent::Drop {
            node: target.clone(),
        })
        .drop;
    viewer.dispatch(ViewEvent::DragEnd { node: dragged });

    let mut out = String::new();
    if let Some(side) = hover {
        let _ = writeln!(out, "Hover: {:?} {}", side, target);
    }
    match outcome {
        Some(DropOutcome::Moved { persisted: true }) => {
            let _ = writeln!(out, "Moved and saved");
        }
        Some(DropOutcome::Moved { persisted: false }) => {
            return Err("moved in memory but the project file could not be written".into());
        }
        Some(DropOutcome::SelfDrop) => {
            let _ = writeln!(out, "Dropped onto itself, nothing changed");
        }
        Some(DropOutcome::Rejected(reason)) => return Err(reason),
        Some(DropOutcome::NoSession) | None => {
            let _ = writeln!(out, "No drag in progress");
        }
    }
    Ok(out)
}

pub fn open(
    storage: &StorageConfig,
    uuid: &str,
    reverse: bool,
    active: Vec<String>,
) -> Result<String, String> {
    let mut viewer = load_viewer(storage, active);
    let id = NodeId::from(uuid);
    require_node(&viewer, &id)?;
    viewer.render_all();
    viewer.switcher_mut().host_mut().take_calls();

    let outcome = viewer.open(&id, reverse);

    let mut out = String::new();
    let _ = writeln!(out, "Outcome: {:?}", outcome);
    describe_calls(viewer.switcher().host().calls(), &mut out);
    Ok(out)
}

pub fn key(paths: &[String]) -> String {
    match state_key(paths) {
        Some(key) => format!("{}\n", key),
        None => "No key for an empty path set\n".to_string(),
    }
}

pub fn states(storage: &StorageConfig) -> Result<String, String> {
    let saved = FileStateStorage::new(storage.clone()).list()?;
    let mut out = String::new();
    if saved.is_empty() {
        let _ = writeln!(out, "No saved states");
        return Ok(out);
    }
    for info in saved {
        let _ = writeln!(
            out,
            "{}  {}  {} bytes",
            info.key,
            info.saved_at.to_rfc3339(),
            info.bytes
        );
    }
    Ok(out)
}

//! Host editor collaborator interface.
//!
//! The core never opens windows or touches the editor layout itself; it asks
//! the host through [`WorkspaceHost`]. [`RecordingHost`] is a host that only
//! records what it was asked to do (dry runs, tests).

use serde::{Deserialize, Serialize};

use crate::state_key::state_key;
use crate::switcher::SwitchFlag;

/// Request to open a project in a fresh window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
    pub paths: Vec<String>,
    pub dev_mode: bool,
    pub safe_mode: bool,
}

/// Calls the host editor must answer for the workspace switcher.
pub trait WorkspaceHost {
    fn open_new_window(&mut self, request: WindowRequest);

    /// The path set of the current window, in the editor's order.
    fn active_paths(&self) -> Vec<String>;

    /// Key under which the state for `paths` is saved. Hosts with their own
    /// keying scheme override this; it must stay a pure function of the
    /// ordered paths.
    fn state_key(&self, paths: &[String]) -> Option<String> {
        state_key(paths)
    }

    /// Serialized state of the current window, if the host has one.
    fn serialize_state(&mut self) -> Option<String>;

    /// Replaces the whole window state with a previously serialized one.
    fn deserialize_state(&mut self, blob: &str);

    fn set_active_paths(&mut self, paths: &[String]);

    fn destroy_active_pane(&mut self);

    fn update_status(&mut self, text: &str);

    /// Restarts a host package so it picks up the new project. Returns false
    /// when no such package is active.
    fn restart_package(&mut self, _name: &str) -> bool {
        false
    }
}

/// One recorded host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    OpenNewWindow(WindowRequest),
    SerializeState,
    DeserializeState(String),
    SetActivePaths {
        paths: Vec<String>,
        switch_in_progress: bool,
    },
    DestroyActivePane,
    UpdateStatus(String),
    RestartPackage(String),
}

/// Layout blob produced by [`RecordingHost::serialize_state`].
#[derive(Debug, Serialize, Deserialize)]
struct RecordedLayout {
    paths: Vec<String>,
    panes: usize,
}

/// Host that keeps a tiny model of a window and records every call.
#[derive(Debug, Default)]
pub struct RecordingHost {
    active_paths: Vec<String>,
    panes: usize,
    active_packages: Vec<String>,
    calls: Vec<HostCall>,
    switch_flag: Option<SwitchFlag>,
}

impl RecordingHost {
    pub fn new(active_paths: Vec<String>) -> Self {
        Self {
            active_paths,
            panes: 1,
            ..Self::default()
        }
    }

    pub fn with_packages(mut self, packages: &[&str]) -> Self {
        self.active_packages = packages.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Records the flag's value on every `set_active_paths`, the way a
    /// path-change listener would see it.
    pub fn observe_switch_flag(&mut self, flag: SwitchFlag) {
        self.switch_flag = Some(flag);
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn panes(&self) -> usize {
        self.panes
    }

    pub fn set_panes(&mut self, panes: usize) {
        self.panes = panes;
    }

    fn record(&mut self, call: HostCall) {
        tracing::info!(call = ?call, "Host call");
        self.calls.push(call);
    }
}

impl WorkspaceHost for RecordingHost {
    fn open_new_window(&mut self, request: WindowRequest) {
        self.record(HostCall::OpenNewWindow(request));
    }

    fn active_paths(&self) -> Vec<String> {
        self.active_paths.clone()
    }

    fn serialize_state(&mut self) -> Option<String> {
        self.record(HostCall::SerializeState);
        let layout = RecordedLayout {
            paths: self.active_paths.clone(),
            panes: self.panes,
        };
        serde_json::to_string(&layout).ok()
    }

    fn deserialize_state(&mut self, blob: &str) {
        self.record(HostCall::DeserializeState(blob.to_string()));
        match serde_json::from_str::<RecordedLayout>(blob) {
            Ok(layout) => {
                self.active_paths = layout.paths;
                self.panes = layout.panes;
            }
            Err(e) => tracing::warn!(error = %e, "Unrecognized layout blob, ignoring"),
        }
    }

    fn set_active_paths(&mut self, paths: &[String]) {
        let switch_in_progress = self
            .switch_flag
            .as_ref()
            .is_some_and(SwitchFlag::is_set);
        self.record(HostCall::SetActivePaths {
            paths: paths.to_vec(),
            switch_in_progress,
        });
        self.active_paths = paths.to_vec();
    }

    fn destroy_active_pane(&mut self) {
        self.record(HostCall::DestroyActivePane);
        self.panes = self.panes.saturating_sub(1);
    }

    fn update_status(&mut self, text: &str) {
        self.record(HostCall::UpdateStatus(text.to_string()));
    }

    fn restart_package(&mut self, name: &str) -> bool {
        if !self.active_packages.iter().any(|p| p == name) {
            return false;
        }
        self.record(HostCall::RestartPackage(name.to_string()));
        true
    }
}

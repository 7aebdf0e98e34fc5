//! ProjectViewer - the entry point hosts talk to.
//!
//! Owns the project store, the view registry, the reorder engine and the
//! workspace switcher, and routes host UI events to them:
//!
//! ```text
//! click ─────────────► WorkspaceSwitcher::open ──► host / state storage
//! drag-* / drop ─────► ReorderEngine ──► ProjectStore::move_node + persist
//! paths changed ─────► re-render selection (ignored mid-switch)
//! ```
//!
//! Everything is synchronous and single-threaded; each call runs to
//! completion for one input event.

use crate::config::ConfigSource;
use crate::drag::{DragPayload, HoverSide};
use crate::host::WorkspaceHost;
use crate::reorder::{DropOutcome, ReorderEngine};
use crate::states::StateStorage;
use crate::store::ProjectStore;
use crate::switcher::{SwitchFlag, SwitchOutcome, WorkspaceSwitcher};
use crate::tree::NodeId;
use crate::view::{ViewBounds, ViewRegistry};

/// A UI event on one node's view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Click { node: NodeId, reverse_modifier: bool },
    DragStart { node: NodeId },
    DragEnter { node: NodeId },
    DragOver { node: NodeId, pointer_y: f64 },
    DragLeave { node: NodeId },
    Drop { node: NodeId },
    DragEnd { node: NodeId },
}

/// What the host should do with its native event, plus what happened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewEventResponse {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    pub payload: Option<DragPayload>,
    pub hover: Option<HoverSide>,
    pub drop: Option<DropOutcome>,
    pub switch: Option<SwitchOutcome>,
}

pub struct ProjectViewer<H, S> {
    store: ProjectStore,
    views: ViewRegistry,
    reorder: ReorderEngine,
    switcher: WorkspaceSwitcher<H, S>,
    config: Box<dyn ConfigSource>,
}

impl<H: WorkspaceHost, S: StateStorage> ProjectViewer<H, S> {
    pub fn new(
        store: ProjectStore,
        host: H,
        storage: S,
        config: impl ConfigSource + 'static,
    ) -> Self {
        let mut viewer = Self {
            store,
            views: ViewRegistry::new(),
            reorder: ReorderEngine::new(),
            switcher: WorkspaceSwitcher::new(host, storage),
            config: Box::new(config),
        };
        viewer.attach_all();
        viewer
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProjectStore {
        &mut self.store
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    pub fn reorder(&self) -> &ReorderEngine {
        &self.reorder
    }

    pub fn switcher(&self) -> &WorkspaceSwitcher<H, S> {
        &self.switcher
    }

    pub fn switcher_mut(&mut self) -> &mut WorkspaceSwitcher<H, S> {
        &mut self.switcher
    }

    pub fn switch_flag(&self) -> SwitchFlag {
        self.switcher.switch_flag()
    }

    /// Attaches a view for every node and detaches views whose node is gone.
    pub fn attach_all(&mut self) {
        let tree = self.store.tree();
        self.views.retain(|id| tree.contains(id));
        tree.walk(|node, _| {
            self.views.attach(node);
        });
    }

    pub fn set_bounds(&mut self, id: &NodeId, bounds: ViewBounds) {
        self.views.set_bounds(id, bounds);
    }

    /// Refreshes every view and shows the open project's breadcrumb.
    ///
    /// Only the first node matching the active path set is selected.
    pub fn render_all(&mut self) {
        self.attach_all();

        let mut open: Option<NodeId> = None;
        for id in self.store.tree().ids() {
            let Some(node) = self.store.find(&id) else {
                continue;
            };
            let is_open = open.is_none() && self.switcher.is_currently_open(node);
            if self.views.render(node, is_open) {
                open = Some(id);
            }
        }

        if let Some(breadcrumb) = open.and_then(|id| self.store.tree().breadcrumb(&id)) {
            self.switcher.host_mut().update_status(&breadcrumb);
        }
    }

    /// Opens `id` with a fresh config snapshot.
    pub fn open(&mut self, id: &NodeId, reverse_modifier: bool) -> SwitchOutcome {
        let config = self.config.snapshot();
        self.switcher.open(
            self.store.tree(),
            &mut self.views,
            id,
            reverse_modifier,
            &config,
        )
    }

    /// Reacts to a change of the host's path set. Returns false when the
    /// change came from our own switch and was ignored.
    pub fn handle_paths_changed(&mut self) -> bool {
        if self.switcher.is_switch_in_progress() {
            tracing::debug!("Ignoring path change caused by project switch");
            return false;
        }
        self.render_all();
        true
    }

    pub fn dispatch(&mut self, event: ViewEvent) -> ViewEventResponse {
        let mut response = ViewEventResponse::default();
        match event {
            ViewEvent::Click {
                node,
                reverse_modifier,
            } => {
                if self.store.find(&node).is_some() {
                    response.switch = Some(self.open(&node, reverse_modifier));
                }
            }
            ViewEvent::DragStart { node } => {
                response.payload = self.reorder.on_drag_start(&mut self.views, &node);
                response.stop_propagation = true;
            }
            ViewEvent::DragEnter { node } => {
                self.reorder.on_drag_enter(&mut self.views, &node);
                response.prevent_default = true;
            }
            ViewEvent::DragOver { node, pointer_y } => {
                response.hover = self.reorder.on_drag_over(&mut self.views, &node, pointer_y);
                response.prevent_default = true;
                response.stop_propagation = true;
            }
            ViewEvent::DragLeave { node } => {
                self.reorder.on_drag_leave(&mut self.views, &node);
                response.prevent_default = true;
            }
            ViewEvent::Drop { node } => {
                let outcome = self
                    .reorder
                    .on_drop(&mut self.store, &mut self.views, &node);
                response.drop = Some(outcome);
                response.stop_propagation = true;
            }
            ViewEvent::DragEnd { node } => {
                self.reorder.on_drag_end(&mut self.views, &node);
                response.stop_propagation = true;
            }
        }
        response
    }
}

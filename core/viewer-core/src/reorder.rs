//! Drag-and-drop reorder protocol.
//!
//! ```text
//! drag-start(A) ──► session { dragged: A }
//!    │
//!    ├─ drag-enter(X) / drag-over(X, y) / drag-leave(X)   (any number of times)
//!    │       hover side = y vs X's midpoint
//!    ▼
//! drop(T) ──► store.move_node(A, T, hover over T == Above) ──► store.persist()
//!    │
//!    ▼
//! drag-end ──► clears A's "dragging" marker
//! ```
//!
//! The session lives only inside one gesture: drop consumes it, and every
//! failure path degrades to a no-op with a log line.

use crate::drag::{DragPayload, DragSession, HoverSide};
use crate::store::ProjectStore;
use crate::tree::NodeId;
use crate::view::ViewRegistry;

/// Result of a drop, reported back to the caller. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The node moved. `persisted` is false when the write failed; the
    /// in-memory move is kept either way.
    Moved { persisted: bool },
    /// Dropped onto itself.
    SelfDrop,
    /// No drag gesture was in progress.
    NoSession,
    /// The store refused the move (unknown node, drop into own subtree).
    Rejected(String),
}

impl DropOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, DropOutcome::Moved { .. })
    }
}

#[derive(Debug, Default)]
pub struct ReorderEngine {
    session: Option<DragSession>,
}

impl ReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Opens a session for `dragged` and marks its view as dragging.
    ///
    /// Returns the payload for the host's data transfer, or `None` when the
    /// node has no view.
    pub fn on_drag_start(
        &mut self,
        views: &mut ViewRegistry,
        dragged: &NodeId,
    ) -> Option<DragPayload> {
        views.get(dragged)?;
        if let Some(stale) = self.session.take() {
            tracing::debug!(dragged = %stale.dragged(), "Replacing unfinished drag");
            Self::clear_session_markers(views, &stale);
        }
        views.update_markers(dragged, |m| m.dragging = true);
        self.session = Some(DragSession::new(dragged.clone()));
        tracing::debug!(dragged = %dragged, "Drag started");
        Some(DragPayload::for_node(dragged))
    }

    /// Marks `hovered` as a drop candidate unless it is the dragged view.
    pub fn on_drag_enter(&mut self, views: &mut ViewRegistry, hovered: &NodeId) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.dragged() == hovered {
            return;
        }
        session.touch(hovered);
        views.update_markers(hovered, |m| m.dropping = true);
    }

    /// Recomputes the hover side against `hovered`'s midpoint.
    pub fn on_drag_over(
        &mut self,
        views: &mut ViewRegistry,
        hovered: &NodeId,
        pointer_y: f64,
    ) -> Option<HoverSide> {
        let session = self.session.as_mut()?;
        let Some(bounds) = views.get(hovered).and_then(|view| view.bounds) else {
            session.leave(hovered);
            return None;
        };

        let side = HoverSide::from_pointer(pointer_y, bounds);
        session.hover_over(hovered, side);
        views.update_markers(hovered, |m| {
            m.above = side == HoverSide::Above;
            m.below = side == HoverSide::Below;
        });
        Some(side)
    }

    /// Clears drop-target markers and the hover side on `hovered`. The
    /// session stays open.
    pub fn on_drag_leave(&mut self, views: &mut ViewRegistry, hovered: &NodeId) {
        views.update_markers(hovered, |m| m.clear_drop_target());
        if let Some(session) = self.session.as_mut() {
            session.leave(hovered);
        }
    }

    /// Resolves the move and persists it. Always closes the session.
    pub fn on_drop(
        &mut self,
        store: &mut ProjectStore,
        views: &mut ViewRegistry,
        dropped_on: &NodeId,
    ) -> DropOutcome {
        views.update_markers(dropped_on, |m| m.clear_drop_target());

        let Some(session) = self.session.take() else {
            return DropOutcome::NoSession;
        };
        for target in session.targets() {
            views.update_markers(target, |m| m.clear_drop_target());
        }

        if session.dragged() == dropped_on {
            tracing::debug!(node = %dropped_on, "Dropped onto itself, ignoring");
            return DropOutcome::SelfDrop;
        }

        let insert_before = session.insert_before(dropped_on);
        if let Err(err) = store.move_node(session.dragged(), dropped_on, insert_before) {
            tracing::warn!(
                dragged = %session.dragged(),
                target = %dropped_on,
                error = %err,
                "Reorder rejected"
            );
            return DropOutcome::Rejected(err.to_string());
        }

        let persisted = match store.persist() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "Failed to persist project order, keeping in-memory move"
                );
                false
            }
        };

        DropOutcome::Moved { persisted }
    }

    /// Clears the dragging marker. Safe after a drop or with no session.
    pub fn on_drag_end(&mut self, views: &mut ViewRegistry, dragged: &NodeId) {
        views.update_markers(dragged, |m| m.dragging = false);
        if let Some(session) = self.session.take() {
            tracing::debug!(dragged = %session.dragged(), "Drag cancelled without drop");
            Self::clear_session_markers(views, &session);
        }
    }

    fn clear_session_markers(views: &mut ViewRegistry, session: &DragSession) {
        views.update_markers(session.dragged(), |m| m.dragging = false);
        for target in session.targets() {
            views.update_markers(target, |m| m.clear_drop_target());
        }
    }
}

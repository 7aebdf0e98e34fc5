//! Transient state of a single drag gesture.
//!
//! A [`DragSession`] exists only between drag-start and drop/drag-end and is
//! owned by the reorder engine.

use crate::tree::NodeId;
use crate::view::ViewBounds;

/// MIME type of the drag payload the host puts on its data transfer.
pub const DRAG_MIME: &str = "text/plain";

/// Which half of the hovered row the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverSide {
    Above,
    Below,
}

impl HoverSide {
    /// Compares the pointer with the row's vertical midpoint.
    ///
    /// Strictly above the midpoint is `Above`; exactly on it is `Below`.
    pub fn from_pointer(pointer_y: f64, bounds: ViewBounds) -> Self {
        if bounds.midpoint() > pointer_y {
            HoverSide::Above
        } else {
            HoverSide::Below
        }
    }

    pub fn insert_before(self) -> bool {
        self == HoverSide::Above
    }
}

/// Payload carried by the host's drag event: the dragged node's uuid as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub mime: &'static str,
    pub data: String,
}

impl DragPayload {
    pub fn for_node(id: &NodeId) -> Self {
        Self {
            mime: DRAG_MIME,
            data: id.to_string(),
        }
    }

    /// Recovers the node id from payload text; blank text yields `None`.
    pub fn parse(data: &str) -> Option<NodeId> {
        let trimmed = data.trim();
        (!trimmed.is_empty()).then(|| NodeId::from(trimmed))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    dragged: NodeId,
    hover: Option<(NodeId, HoverSide)>,
    targets: Vec<NodeId>,
}

impl DragSession {
    pub fn new(dragged: NodeId) -> Self {
        Self {
            dragged,
            hover: None,
            targets: Vec::new(),
        }
    }

    pub fn dragged(&self) -> &NodeId {
        &self.dragged
    }

    /// The last measured side and the node it was measured against.
    pub fn hover(&self) -> Option<(&NodeId, HoverSide)> {
        self.hover.as_ref().map(|(id, side)| (id, *side))
    }

    pub fn hover_over(&mut self, target: &NodeId, side: HoverSide) {
        self.hover = Some((target.clone(), side));
        self.touch(target);
    }

    /// Forgets the hover side if it was measured against `target`.
    pub fn leave(&mut self, target: &NodeId) {
        if self.hover.as_ref().is_some_and(|(id, _)| id == target) {
            self.hover = None;
        }
    }

    /// Remembers a view that may carry drop-target markers.
    pub fn touch(&mut self, target: &NodeId) {
        if !self.targets.contains(target) {
            self.targets.push(target.clone());
        }
    }

    /// Views that received drop-target markers during this gesture.
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// True only when the pointer was last measured above `dropped_on`
    /// itself. A drop with no drag-over on the target inserts after it.
    pub fn insert_before(&self, dropped_on: &NodeId) -> bool {
        self.hover
            .as_ref()
            .is_some_and(|(id, side)| id == dropped_on && side.insert_before())
    }
}

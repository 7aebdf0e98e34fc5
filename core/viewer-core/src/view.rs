//! View-side state for project nodes.
//!
//! The host owns real widgets; this module keeps the per-node visual state
//! the core drives (selection, drag markers, geometry used by the midpoint
//! rule) in an explicit `uuid -> NodeView` registry. Views are registered
//! with [`ViewRegistry::attach`] and dropped with [`ViewRegistry::detach`].

use std::collections::HashMap;

use crate::tree::{NodeId, ProjectNode};

const DEVICONS_PREFIX: &str = "devicons-";

/// Visual markers a host maps to CSS classes or equivalent styling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewMarkers {
    pub selected: bool,
    pub no_paths: bool,
    pub dragging: bool,
    pub dropping: bool,
    pub above: bool,
    pub below: bool,
}

impl ViewMarkers {
    /// Drop-target markers only; `dragging` belongs to the dragged view.
    pub fn clear_drop_target(&mut self) {
        self.dropping = false;
        self.above = false;
        self.below = false;
    }

    /// Class names in a stable order, for hosts that render class lists.
    pub fn class_names(&self) -> Vec<&'static str> {
        [
            (self.selected, "selected"),
            (self.no_paths, "no-paths"),
            (self.dragging, "dragging"),
            (self.dropping, "dropping"),
            (self.above, "above"),
            (self.below, "below"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

/// Vertical placement of a rendered row, in the same coordinate space as the
/// pointer positions the host reports during drag-over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub top: f64,
    pub height: f64,
}

impl ViewBounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub uuid: NodeId,
    pub label: String,
    pub icon_classes: Vec<String>,
    pub accent: Option<String>,
    pub markers: ViewMarkers,
    pub bounds: Option<ViewBounds>,
}

impl NodeView {
    fn for_node(node: &ProjectNode) -> Self {
        let mut view = NodeView {
            uuid: node.uuid.clone(),
            label: String::new(),
            icon_classes: Vec::new(),
            accent: None,
            markers: ViewMarkers::default(),
            bounds: None,
        };
        view.sync(node);
        view
    }

    fn sync(&mut self, node: &ProjectNode) {
        self.label = node.name.clone();
        self.icon_classes = icon_classes(node.icon.as_deref());
        self.accent = node.color.clone();
        self.markers.no_paths = node.paths.is_empty();
    }
}

/// Icons named `devicons-*` come from the devicons font; everything else is
/// an octicon-style `icon` class.
pub fn icon_classes(icon: Option<&str>) -> Vec<String> {
    match icon {
        Some(icon) if icon.starts_with(DEVICONS_PREFIX) => {
            vec!["devicons".to_string(), icon.to_string()]
        }
        Some(icon) if !icon.is_empty() => vec!["icon".to_string(), icon.to_string()],
        _ => Vec::new(),
    }
}

/// Registry of attached node views, keyed by node identity.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: HashMap<NodeId, NodeView>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or refreshes) the view for `node`.
    pub fn attach(&mut self, node: &ProjectNode) -> &mut NodeView {
        self.views
            .entry(node.uuid.clone())
            .and_modify(|view| view.sync(node))
            .or_insert_with(|| NodeView::for_node(node))
    }

    pub fn detach(&mut self, id: &NodeId) -> Option<NodeView> {
        self.views.remove(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&NodeView> {
        self.views.get(id)
    }

    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut NodeView> {
        self.views.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn set_bounds(&mut self, id: &NodeId, bounds: ViewBounds) {
        if let Some(view) = self.views.get_mut(id) {
            view.bounds = Some(bounds);
        }
    }

    /// Refreshes label/icon/markers for `node`; `is_open` drives `selected`.
    ///
    /// Returns true when the node is the open project, i.e. the status bar
    /// should show its breadcrumb.
    pub fn render(&mut self, node: &ProjectNode, is_open: bool) -> bool {
        let view = self.attach(node);
        view.markers.selected = is_open;
        is_open
    }

    /// The node currently carrying the `selected` marker, if any.
    pub fn selected(&self) -> Option<&NodeId> {
        self.views
            .values()
            .find(|view| view.markers.selected)
            .map(|view| &view.uuid)
    }

    /// Moves the `selected` marker to `id`, clearing it everywhere else.
    pub fn select(&mut self, id: &NodeId) {
        for view in self.views.values_mut() {
            view.markers.selected = &view.uuid == id;
        }
    }

    /// Applies `f` to the markers of `id` if that view is attached.
    pub fn update_markers(&mut self, id: &NodeId, f: impl FnOnce(&mut ViewMarkers)) {
        if let Some(view) = self.views.get_mut(id) {
            f(&mut view.markers);
        }
    }

    /// Keeps only the views whose id passes `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&NodeId) -> bool) {
        self.views.retain(|id, _| keep(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_classes() {
        assert_eq!(
            icon_classes(Some("devicons-rust")),
            vec!["devicons", "devicons-rust"]
        );
        assert_eq!(icon_classes(Some("icon-repo")), vec!["icon", "icon-repo"]);
        assert!(icon_classes(None).is_empty());
        assert!(icon_classes(Some("")).is_empty());
    }

    #[test]
    fn test_attach_sets_no_paths_for_groups() {
        let mut views = ViewRegistry::new();
        let group = ProjectNode::group("Group").with_uuid("g");
        let view = views.attach(&group);
        assert!(view.markers.no_paths);
        assert_eq!(view.label, "Group");
    }

    #[test]
    fn test_render_marks_open_project_selected() {
        let mut views = ViewRegistry::new();
        let a = ProjectNode::project("A", vec!["/a".into()]).with_uuid("a");
        let b = ProjectNode::project("B", vec!["/b".into()]).with_uuid("b");

        assert!(!views.render(&a, false));
        assert!(views.render(&b, true));
        assert_eq!(views.selected(), Some(&NodeId::from("b")));
        assert_eq!(views.get(&"b".into()).unwrap().markers.class_names(), vec!["selected"]);
    }

    #[test]
    fn test_select_moves_marker() {
        let mut views = ViewRegistry::new();
        let a = ProjectNode::project("A", vec!["/a".into()]).with_uuid("a");
        let b = ProjectNode::project("B", vec!["/b".into()]).with_uuid("b");
        views.render(&a, true);
        views.attach(&b);

        views.select(&"b".into());
        assert!(!views.get(&"a".into()).unwrap().markers.selected);
        assert!(views.get(&"b".into()).unwrap().markers.selected);
    }

    #[test]
    fn test_reattach_keeps_markers_and_bounds() {
        let mut views = ViewRegistry::new();
        let mut a = ProjectNode::project("A", vec!["/a".into()]).with_uuid("a");
        views.attach(&a);
        views.set_bounds(&a.uuid, ViewBounds::new(10.0, 20.0));
        views.update_markers(&a.uuid, |m| m.dragging = true);

        a.name = "Renamed".into();
        let view = views.attach(&a);
        assert_eq!(view.label, "Renamed");
        assert!(view.markers.dragging);
        assert_eq!(view.bounds, Some(ViewBounds::new(10.0, 20.0)));
    }

    #[test]
    fn test_detach_removes_view() {
        let mut views = ViewRegistry::new();
        let a = ProjectNode::project("A", vec!["/a".into()]).with_uuid("a");
        views.attach(&a);
        assert!(views.detach(&a.uuid).is_some());
        assert!(views.is_empty());
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(ViewBounds::new(100.0, 30.0).midpoint(), 115.0);
    }
}

//! The ordered project tree.
//!
//! Sibling order is meaningful: it drives render order and is what a drag
//! reorder changes. Nodes are addressed by [`NodeId`], which never changes
//! after creation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ViewerError};

/// Separator used when joining ancestor names into a breadcrumb.
pub const BREADCRUMB_SEPARATOR: &str = " / ";

/// Stable identifier of a project node (a ULID string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single entry of the project tree.
///
/// A node with no `paths` is a group: it can hold children and be reordered,
/// but it cannot be opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectNode {
    pub uuid: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub dev_mode: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ProjectNode>,
}

impl ProjectNode {
    /// Creates an openable project pointing at `paths` (kept in the given order).
    pub fn project(name: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            uuid: NodeId::new(),
            name: name.into(),
            icon: None,
            color: None,
            paths,
            dev_mode: false,
            children: Vec::new(),
        }
    }

    /// Creates a group with no paths.
    pub fn group(name: impl Into<String>) -> Self {
        Self::project(name, Vec::new())
    }

    pub fn with_uuid(mut self, uuid: impl Into<NodeId>) -> Self {
        self.uuid = uuid.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn with_children(mut self, children: Vec<ProjectNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_openable(&self) -> bool {
        !self.paths.is_empty()
    }
}

/// Position of a node: its parent (`None` for the top level) and sibling index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLocation {
    pub parent: Option<NodeId>,
    pub index: usize,
}

/// Ordered forest of project nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTree {
    #[serde(default)]
    pub roots: Vec<ProjectNode>,
}

impl ProjectTree {
    pub fn new(roots: Vec<ProjectNode>) -> Self {
        Self { roots }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes at every depth.
    pub fn len(&self) -> usize {
        fn count(nodes: &[ProjectNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.roots)
    }

    /// All node ids in depth-first render order.
    pub fn ids(&self) -> Vec<NodeId> {
        fn collect(nodes: &[ProjectNode], out: &mut Vec<NodeId>) {
            for node in nodes {
                out.push(node.uuid.clone());
                collect(&node.children, out);
            }
        }
        let mut out = Vec::with_capacity(self.len());
        collect(&self.roots, &mut out);
        out
    }

    /// Depth-first walk in render order; `visit` receives each node with its depth.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a ProjectNode, usize)) {
        fn go<'a>(
            nodes: &'a [ProjectNode],
            depth: usize,
            visit: &mut impl FnMut(&'a ProjectNode, usize),
        ) {
            for node in nodes {
                visit(node, depth);
                go(&node.children, depth + 1, visit);
            }
        }
        go(&self.roots, 0, &mut visit);
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    pub fn find(&self, id: &NodeId) -> Option<&ProjectNode> {
        find_in(&self.roots, id)
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut ProjectNode> {
        find_in_mut(&mut self.roots, id)
    }

    /// Returns the parent of `id`, or `None` if `id` is top-level or absent.
    pub fn find_parent(&self, id: &NodeId) -> Option<&ProjectNode> {
        let parent = self.locate(id)?.parent?;
        self.find(&parent)
    }

    pub fn locate(&self, id: &NodeId) -> Option<NodeLocation> {
        locate_in(&self.roots, None, id)
    }

    /// Sibling list holding `id` (including `id` itself).
    pub fn siblings(&self, id: &NodeId) -> Option<&[ProjectNode]> {
        let location = self.locate(id)?;
        match location.parent {
            None => Some(&self.roots),
            Some(parent) => self.find(&parent).map(|p| p.children.as_slice()),
        }
    }

    /// Appends `node` under `parent`, or at the top level when `parent` is `None`.
    pub fn insert(&mut self, parent: Option<&NodeId>, node: ProjectNode) -> Result<()> {
        self.children_mut(parent)?.push(node);
        Ok(())
    }

    /// Ancestor names followed by the node's own name, joined with
    /// [`BREADCRUMB_SEPARATOR`].
    pub fn breadcrumb(&self, id: &NodeId) -> Option<String> {
        let mut chain = Vec::new();
        if !chain_to(&self.roots, id, &mut chain) {
            return None;
        }
        Some(
            chain
                .iter()
                .map(|node| node.name.as_str())
                .collect::<Vec<_>>()
                .join(BREADCRUMB_SEPARATOR),
        )
    }

    /// Relocates `dragged` immediately before (`insert_before`) or after `target`.
    ///
    /// The dragged node takes `target`'s parent, so this also moves nodes
    /// across groups. The node set and count are unchanged. The dragged
    /// node's subtree travels with it.
    pub fn move_node(
        &mut self,
        dragged: &NodeId,
        target: &NodeId,
        insert_before: bool,
    ) -> Result<()> {
        if dragged == target {
            return Err(ViewerError::InvalidMove {
                dragged: dragged.clone(),
                target: target.clone(),
                reason: "a node cannot be moved relative to itself",
            });
        }

        let dragged_node = self
            .find(dragged)
            .ok_or_else(|| ViewerError::NodeNotFound(dragged.clone()))?;
        if find_in(&dragged_node.children, target).is_some() {
            return Err(ViewerError::InvalidMove {
                dragged: dragged.clone(),
                target: target.clone(),
                reason: "target is inside the dragged node",
            });
        }
        if !self.contains(target) {
            return Err(ViewerError::NodeNotFound(target.clone()));
        }

        let node = self.detach(dragged)?;

        // Target position is resolved after removal so same-list moves land
        // next to the target rather than one slot off.
        let location = self
            .locate(target)
            .ok_or_else(|| ViewerError::NodeNotFound(target.clone()))?;
        let index = if insert_before {
            location.index
        } else {
            location.index + 1
        };
        self.children_mut(location.parent.as_ref())?.insert(index, node);
        Ok(())
    }

    fn detach(&mut self, id: &NodeId) -> Result<ProjectNode> {
        let location = self
            .locate(id)
            .ok_or_else(|| ViewerError::NodeNotFound(id.clone()))?;
        Ok(self.children_mut(location.parent.as_ref())?.remove(location.index))
    }

    fn children_mut(&mut self, parent: Option<&NodeId>) -> Result<&mut Vec<ProjectNode>> {
        match parent {
            None => Ok(&mut self.roots),
            Some(id) => self
                .find_mut(id)
                .map(|node| &mut node.children)
                .ok_or_else(|| ViewerError::NodeNotFound(id.clone())),
        }
    }
}

fn find_in<'a>(nodes: &'a [ProjectNode], id: &NodeId) -> Option<&'a ProjectNode> {
    for node in nodes {
        if &node.uuid == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [ProjectNode], id: &NodeId) -> Option<&'a mut ProjectNode> {
    for node in nodes.iter_mut() {
        if &node.uuid == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn locate_in(
    nodes: &[ProjectNode],
    parent: Option<&NodeId>,
    id: &NodeId,
) -> Option<NodeLocation> {
    for (index, node) in nodes.iter().enumerate() {
        if &node.uuid == id {
            return Some(NodeLocation {
                parent: parent.cloned(),
                index,
            });
        }
        if let Some(found) = locate_in(&node.children, Some(&node.uuid), id) {
            return Some(found);
        }
    }
    None
}

fn chain_to<'a>(
    nodes: &'a [ProjectNode],
    id: &NodeId,
    chain: &mut Vec<&'a ProjectNode>,
) -> bool {
    for node in nodes {
        chain.push(node);
        if &node.uuid == id || chain_to(&node.children, id, chain) {
            return true;
        }
        chain.pop();
    }
    false
}

//! Node arena.
//!
//! Nodes live in a map keyed by [`NodeId`]; parent and child links are plain
//! ids. The tree enforces single parenthood and rejects cycles.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use tessera_core::{Dimension, Insets, NodeId, TreeError, Vector2};

use crate::absolute::AbsoluteLayout;
use crate::system::{LayoutProperties, LayoutSettings, LayoutSystem};

/// A box in the layout tree.
///
/// Sizing fields are public; structure (parent, children, attachment) is only
/// changed through [`LayoutTree`] or the engine.
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    /// Optional name for debugging
    pub name: Option<String>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub min_width: Option<Dimension>,
    pub max_width: Option<Dimension>,
    pub min_height: Option<Dimension>,
    pub max_height: Option<Dimension>,
    pub padding: Insets,
    /// Width / height
    pub aspect_ratio: Option<f64>,
    /// How this node arranges its children
    pub layout_system: Rc<dyn LayoutSystem>,
    /// Settings for `layout_system`
    pub layout_settings: LayoutSettings,
    /// How the parent should place this node
    pub layout_properties: LayoutProperties,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
    absolute_position: Vector2,
    absolute_size: Vector2,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout_system", &self.layout_system)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("absolute_position", &self.absolute_position)
            .field("absolute_size", &self.absolute_size)
            .finish_non_exhaustive()
    }
}

impl Node {
    /// Create a detached node using the absolute layout system.
    ///
    /// The id is assigned when the node is inserted into a tree.
    pub fn new() -> Self {
        Self {
            id: NodeId(0),
            name: None,
            width: None,
            height: None,
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
            padding: Insets::ZERO,
            aspect_ratio: None,
            layout_system: Rc::new(AbsoluteLayout),
            layout_settings: LayoutSettings::default(),
            layout_properties: LayoutProperties::default(),
            parent: None,
            children: Vec::new(),
            attached: false,
            absolute_position: Vector2::ZERO,
            absolute_size: Vector2::ZERO,
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_width(mut self, width: Dimension) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: Dimension) -> Self {
        self.height = Some(height);
        self
    }

    /// Set both preferred dimensions to fixed pixel sizes.
    pub fn with_size(self, width: f64, height: f64) -> Self {
        self.with_width(Dimension::offset(width))
            .with_height(Dimension::offset(height))
    }

    pub fn with_min_width(mut self, min_width: Dimension) -> Self {
        self.min_width = Some(min_width);
        self
    }

    pub fn with_max_width(mut self, max_width: Dimension) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_min_height(mut self, min_height: Dimension) -> Self {
        self.min_height = Some(min_height);
        self
    }

    pub fn with_max_height(mut self, max_height: Dimension) -> Self {
        self.max_height = Some(max_height);
        self
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: f64) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    /// Set the layout system used to arrange this node's children.
    pub fn with_layout_system(mut self, system: impl LayoutSystem + 'static) -> Self {
        self.layout_system = Rc::new(system);
        self
    }

    pub fn with_layout_settings(mut self, settings: impl Into<LayoutSettings>) -> Self {
        self.layout_settings = settings.into();
        self
    }

    pub fn with_layout_properties(mut self, properties: impl Into<LayoutProperties>) -> Self {
        self.layout_properties = properties.into();
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node is reachable from an engine root.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Position written by the last layout run.
    pub fn absolute_position(&self) -> Vector2 {
        self.absolute_position
    }

    /// Size written by the last layout run.
    pub fn absolute_size(&self) -> Vector2 {
        self.absolute_size
    }

    pub(crate) fn set_placement(&mut self, position: Vector2, size: Vector2) {
        self.absolute_position = position;
        self.absolute_size = size;
    }
}

/// Id-keyed storage for every node known to an engine.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    /// All nodes in the tree, indexed by ID
    nodes: HashMap<NodeId, Node>,
    /// Counter for generating unique IDs
    next_id: u64,
}

impl LayoutTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a node into the tree, detached, and return its new id.
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = id;
        node.parent = None;
        node.children.clear();
        node.attached = false;
        self.nodes.insert(id, node);
        id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get children of a node, in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|child_id| self.nodes.get(child_id))
    }

    fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::UnknownNode { id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(&id).ok_or(TreeError::UnknownNode { id })
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes.get(&node).and_then(|n| n.parent);
        }
        false
    }

    /// `id` and all of its descendants, parents first.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Append `child` to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let len = self.node(parent)?.children.len();
        self.insert_child(parent, child, len)
    }

    /// Insert `child` into `parent`'s children at `index`.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        let len = self.node(parent)?.children.len();
        let existing = self.node(child)?.parent;
        if self.is_ancestor(child, parent) {
            return Err(TreeError::WouldCreateCycle { parent, child });
        }
        if let Some(existing) = existing {
            return Err(TreeError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if index > len {
            return Err(TreeError::IndexOutOfBounds { index, len });
        }

        self.link(parent, child, index);
        Ok(())
    }

    /// Put `child` under `parent` at `index` (clamped) without validation.
    ///
    /// Callers guarantee both nodes exist, `child` has no parent and the link
    /// creates no cycle.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);
        let attached = parent_node.attached;
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = Some(parent);
        }
        self.set_attached(child, attached);
    }

    /// Detach `child` from `parent`. The child stays in the arena.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let position = self.position_of(parent, child)?;
        self.node_mut(parent)?.children.remove(position);
        self.node_mut(child)?.parent = None;
        self.set_attached(child, false);
        Ok(())
    }

    /// Move `child` to `index` within `parent`'s children.
    pub fn move_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        let position = self.position_of(parent, child)?;
        let children = &mut self.node_mut(parent)?.children;
        if index >= children.len() {
            return Err(TreeError::IndexOutOfBounds {
                index,
                len: children.len(),
            });
        }
        let id = children.remove(position);
        children.insert(index, id);
        Ok(())
    }

    /// Detach every child of `parent`, returning their ids.
    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        for &child in &children {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = None;
            }
            self.set_attached(child, false);
        }
        Ok(children)
    }

    /// Remove `id` and its whole subtree from the arena.
    ///
    /// Returns the removed node; its child list names nodes that no longer exist.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, TreeError> {
        if let Some(parent) = self.node(id)?.parent {
            self.remove_child(parent, id)?;
        }
        let subtree = self.subtree(id);
        let mut removed = None;
        for node_id in subtree {
            let node = self.nodes.remove(&node_id);
            if node_id == id {
                removed = node;
            }
        }
        removed.ok_or(TreeError::UnknownNode { id })
    }

    /// Mark `id` and its subtree as attached to (or detached from) an engine.
    pub(crate) fn set_attached(&mut self, id: NodeId, attached: bool) {
        for node_id in self.subtree(id) {
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.attached = attached;
            }
        }
    }

    fn position_of(&self, parent: NodeId, child: NodeId) -> Result<usize, TreeError> {
        self.node(child)?;
        self.node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::NotAChild { parent, child })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{ListLayout, ListProperties};

    fn tree_with(count: usize) -> (LayoutTree, Vec<NodeId>) {
        let mut tree = LayoutTree::new();
        let ids = (0..count)
            .map(|i| tree.insert(Node::new().with_name(format!("n{i}"))))
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let (tree, ids) = tree_with(3);
        assert_eq!(ids, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(ids[1]).unwrap().name.as_deref(), Some("n1"));
        assert_eq!(tree.get(ids[1]).unwrap().id(), ids[1]);
    }

    #[test]
    fn test_builder() {
        let node = Node::new()
            .with_size(100.0, 50.0)
            .with_min_width(Dimension::offset(10.0))
            .with_max_height(Dimension::scale(1.0))
            .with_padding(Insets::uniform(4.0))
            .with_aspect_ratio(2.0)
            .with_layout_system(ListLayout)
            .with_layout_properties(ListProperties::grow(1.0));
        assert_eq!(node.width, Some(Dimension::offset(100.0)));
        assert_eq!(node.height, Some(Dimension::offset(50.0)));
        assert_eq!(node.min_width, Some(Dimension::offset(10.0)));
        assert_eq!(node.max_height, Some(Dimension::scale(1.0)));
        assert_eq!(node.padding.top, 4.0);
        assert_eq!(node.aspect_ratio, Some(2.0));
        assert!(matches!(node.layout_properties, LayoutProperties::List(_)));
    }

    #[test]
    fn test_add_and_order_children() {
        let (mut tree, ids) = tree_with(4);
        tree.add_child(ids[0], ids[1]).unwrap();
        tree.add_child(ids[0], ids[2]).unwrap();
        tree.insert_child(ids[0], ids[3], 0).unwrap();
        assert_eq!(tree.get(ids[0]).unwrap().children(), &[ids[3], ids[1], ids[2]]);
        assert_eq!(tree.get(ids[2]).unwrap().parent(), Some(ids[0]));

        let names: Vec<_> = tree
            .children(ids[0])
            .map(|n| n.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["n3", "n1", "n2"]);
    }

    #[test]
    fn test_single_parent() {
        let (mut tree, ids) = tree_with(3);
        tree.add_child(ids[0], ids[2]).unwrap();
        let err = tree.add_child(ids[1], ids[2]).unwrap_err();
        assert_eq!(
            err,
            TreeError::AlreadyParented {
                child: ids[2],
                parent: ids[0]
            }
        );
    }

    #[test]
    fn test_rejects_cycles() {
        let (mut tree, ids) = tree_with(3);
        tree.add_child(ids[0], ids[1]).unwrap();
        tree.add_child(ids[1], ids[2]).unwrap();
        assert_eq!(
            tree.add_child(ids[2], ids[0]),
            Err(TreeError::WouldCreateCycle {
                parent: ids[2],
                child: ids[0]
            })
        );
        assert!(matches!(
            tree.add_child(ids[1], ids[1]),
            Err(TreeError::WouldCreateCycle { .. })
        ));
    }

    #[test]
    fn test_unknown_nodes() {
        let (mut tree, ids) = tree_with(1);
        let missing = NodeId(99);
        assert_eq!(
            tree.add_child(ids[0], missing),
            Err(TreeError::UnknownNode { id: missing })
        );
        assert_eq!(
            tree.remove_child(missing, ids[0]),
            Err(TreeError::UnknownNode { id: missing })
        );
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let (mut tree, ids) = tree_with(2);
        assert_eq!(
            tree.insert_child(ids[0], ids[1], 1),
            Err(TreeError::IndexOutOfBounds { index: 1, len: 0 })
        );
    }

    #[test]
    fn test_remove_child() {
        let (mut tree, ids) = tree_with(3);
        tree.add_child(ids[0], ids[1]).unwrap();
        tree.add_child(ids[0], ids[2]).unwrap();
        tree.remove_child(ids[0], ids[1]).unwrap();
        assert_eq!(tree.get(ids[0]).unwrap().children(), &[ids[2]]);
        assert_eq!(tree.get(ids[1]).unwrap().parent(), None);
        assert!(tree.contains(ids[1]));
        assert_eq!(
            tree.remove_child(ids[0], ids[1]),
            Err(TreeError::NotAChild {
                parent: ids[0],
                child: ids[1]
            })
        );
    }

    #[test]
    fn test_move_child() {
        let (mut tree, ids) = tree_with(4);
        for &child in &ids[1..] {
            tree.add_child(ids[0], child).unwrap();
        }
        tree.move_child(ids[0], ids[3], 0).unwrap();
        assert_eq!(tree.get(ids[0]).unwrap().children(), &[ids[3], ids[1], ids[2]]);
        tree.move_child(ids[0], ids[3], 2).unwrap();
        assert_eq!(tree.get(ids[0]).unwrap().children(), &[ids[1], ids[2], ids[3]]);
        assert_eq!(
            tree.move_child(ids[0], ids[1], 3),
            Err(TreeError::IndexOutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_remove_all_children() {
        let (mut tree, ids) = tree_with(3);
        tree.add_child(ids[0], ids[1]).unwrap();
        tree.add_child(ids[0], ids[2]).unwrap();
        let removed = tree.remove_all_children(ids[0]).unwrap();
        assert_eq!(removed, vec![ids[1], ids[2]]);
        assert!(tree.get(ids[0]).unwrap().children().is_empty());
        assert!(removed.iter().all(|&id| tree.get(id).unwrap().parent().is_none()));
    }

    #[test]
    fn test_remove_subtree() {
        let (mut tree, ids) = tree_with(4);
        tree.add_child(ids[0], ids[1]).unwrap();
        tree.add_child(ids[1], ids[2]).unwrap();
        tree.add_child(ids[2], ids[3]).unwrap();
        let removed = tree.remove(ids[1]).unwrap();
        assert_eq!(removed.id(), ids[1]);
        assert_eq!(tree.len(), 1);
        assert!(tree.get(ids[0]).unwrap().children().is_empty());
    }

    #[test]
    fn test_link_clamps_index_and_propagates_attachment() {
        let (mut tree, ids) = tree_with(3);
        tree.set_attached(ids[0], true);
        tree.link(ids[0], ids[1], 0);
        tree.link(ids[0], ids[2], 10);
        assert_eq!(tree.get(ids[0]).unwrap().children(), &[ids[1], ids[2]]);
        assert_eq!(tree.get(ids[2]).unwrap().parent(), Some(ids[0]));
        assert!(tree.get(ids[2]).unwrap().is_attached());
    }

    #[test]
    fn test_attachment_propagates_to_subtree() {
        let (mut tree, ids) = tree_with(4);
        tree.set_attached(ids[0], true);
        tree.add_child(ids[1], ids[2]).unwrap();
        tree.add_child(ids[2], ids[3]).unwrap();
        assert!(!tree.get(ids[3]).unwrap().is_attached());

        tree.add_child(ids[0], ids[1]).unwrap();
        assert!(ids.iter().all(|&id| tree.get(id).unwrap().is_attached()));

        tree.remove_child(ids[0], ids[1]).unwrap();
        assert!(tree.get(ids[0]).unwrap().is_attached());
        assert!(ids[1..].iter().all(|&id| !tree.get(id).unwrap().is_attached()));
    }

    #[test]
    fn test_subtree_order() {
        let (mut tree, ids) = tree_with(4);
        tree.add_child(ids[0], ids[1]).unwrap();
        tree.add_child(ids[1], ids[3]).unwrap();
        tree.add_child(ids[0], ids[2]).unwrap();
        assert_eq!(tree.subtree(ids[0]), vec![ids[0], ids[1], ids[3], ids[2]]);
        assert!(tree.is_ancestor(ids[0], ids[3]));
        assert!(!tree.is_ancestor(ids[2], ids[3]));
    }
}

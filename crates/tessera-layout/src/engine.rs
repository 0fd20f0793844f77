//! The layout engine: owns a node tree and runs the layout passes over it.
//!
//! A run has four steps:
//!
//! 1. **Measure**, top-down: every node reports its own sizing requirements.
//! 2. **Resolve**, bottom-up: requirements are finalized, children first.
//! 3. **Root sizing**: the root is sized against a zero parent, filling open
//!    axes from its content.
//! 4. **Finalize**, top-down: each node's layout system places its children,
//!    and the placement callback sees every node once.
//!
//! All passes use explicit stacks, so tree depth is only limited by memory.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use log::debug;
use smallvec::SmallVec;
use tessera_core::{Dimension, Insets, NodeId, TextDirection, TreeError, Vector2};

use crate::measure::{FinalizedMap, FinalizedResult, MeasureMap, MeasureResult};
use crate::system::{self, Environment, LayoutContext, LayoutProperties, LayoutSettings, LayoutSystem};
use crate::tree::{LayoutTree, Node};

/// One node's final box, as handed to the placement callback.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    /// The node's parent. For the root this is the engine's sentinel.
    pub parent: &'a Node,
    pub node: &'a Node,
    pub position: Vector2,
    pub size: Vector2,
}

type Placer = Box<dyn FnMut(&Placement<'_>)>;

/// Owns a layout tree and recomputes it on demand.
///
/// Every mutation that can change the layout goes through the engine, which
/// sets a dirty flag; [`compute`](Self::compute) does nothing while the flag
/// is clear.
pub struct LayoutEngine {
    tree: LayoutTree,
    /// Synthetic parent of the root; never laid out itself
    sentinel: NodeId,
    root: NodeId,
    env: Environment,
    placer: Option<Placer>,
    needs_layout: bool,
    results: FinalizedMap,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("root", &self.root)
            .field("nodes", &self.tree.len())
            .field("env", &self.env)
            .field("needs_layout", &self.needs_layout)
            .finish_non_exhaustive()
    }
}

impl LayoutEngine {
    /// Create an engine with an empty absolute root.
    pub fn new() -> Self {
        let mut tree = LayoutTree::new();
        let sentinel = tree.insert(Node::new().with_name("sentinel"));
        tree.set_attached(sentinel, true);
        let root = tree.insert(Node::new().with_name("root"));
        tree.link(sentinel, root, 0);

        Self {
            tree,
            sentinel,
            root,
            env: Environment::default(),
            placer: None,
            needs_layout: true,
            results: FinalizedMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn set_environment(&mut self, env: Environment) {
        self.env = env;
        self.needs_layout = true;
    }

    pub fn set_text_direction(&mut self, text_direction: TextDirection) {
        self.set_environment(Environment::new(text_direction));
    }

    /// Install the callback invoked for every node placed by [`compute`](Self::compute).
    pub fn set_placer(&mut self, placer: impl FnMut(&Placement<'_>) + 'static) {
        self.placer = Some(Box::new(placer));
    }

    pub fn clear_placer(&mut self) {
        self.placer = None;
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Force the next [`compute`](Self::compute) to run.
    pub fn mark_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    /// Move a node into the engine. It starts detached.
    pub fn insert(&mut self, node: Node) -> NodeId {
        self.tree.insert(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    /// The box computed for `id` by the last run.
    pub fn layout(&self, id: NodeId) -> Option<FinalizedResult> {
        self.results.get(&id).copied()
    }

    /// Replace the root with a detached node.
    ///
    /// The previous root is detached but stays in the engine.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.check_reserved(id)?;
        if id == self.root {
            return Ok(());
        }
        let node = self.tree.get(id).ok_or(TreeError::UnknownNode { id })?;
        if let Some(parent) = node.parent() {
            return Err(TreeError::AlreadyParented { child: id, parent });
        }
        self.tree.remove_child(self.sentinel, self.root)?;
        self.tree.add_child(self.sentinel, id)?;
        self.root = id;
        self.needs_layout = true;
        Ok(())
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_reserved(parent)?;
        self.check_reserved(child)?;
        self.tree.add_child(parent, child)?;
        self.touch(child);
        Ok(())
    }

    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<(), TreeError> {
        self.check_reserved(parent)?;
        self.check_reserved(child)?;
        self.tree.insert_child(parent, child, index)?;
        self.touch(child);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_reserved(parent)?;
        self.check_reserved(child)?;
        self.tree.remove_child(parent, child)?;
        self.touch(parent);
        Ok(())
    }

    pub fn move_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<(), TreeError> {
        self.check_reserved(parent)?;
        self.tree.move_child(parent, child, index)?;
        self.touch(parent);
        Ok(())
    }

    /// Detach every child of `parent`, returning their ids.
    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<Vec<NodeId>, TreeError> {
        self.check_reserved(parent)?;
        let removed = self.tree.remove_all_children(parent)?;
        self.touch(parent);
        Ok(removed)
    }

    /// Drop `id` and its subtree from the engine. The root cannot be removed.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, TreeError> {
        self.check_reserved(id)?;
        if id == self.root {
            return Err(TreeError::ReservedNode { id });
        }
        let attached = self.tree.get(id).is_some_and(Node::is_attached);
        let subtree = self.tree.subtree(id);
        let node = self.tree.remove(id)?;
        for removed in &subtree {
            self.results.shift_remove(removed);
        }
        if attached {
            self.needs_layout = true;
        }
        Ok(node)
    }

    pub fn set_width(&mut self, id: NodeId, width: impl Into<Option<Dimension>>) -> Result<(), TreeError> {
        let width = width.into();
        self.edit(id, |node| node.width = width)
    }

    pub fn set_height(&mut self, id: NodeId, height: impl Into<Option<Dimension>>) -> Result<(), TreeError> {
        let height = height.into();
        self.edit(id, |node| node.height = height)
    }

    pub fn set_min_width(&mut self, id: NodeId, min_width: impl Into<Option<Dimension>>) -> Result<(), TreeError> {
        let min_width = min_width.into();
        self.edit(id, |node| node.min_width = min_width)
    }

    pub fn set_max_width(&mut self, id: NodeId, max_width: impl Into<Option<Dimension>>) -> Result<(), TreeError> {
        let max_width = max_width.into();
        self.edit(id, |node| node.max_width = max_width)
    }

    pub fn set_min_height(&mut self, id: NodeId, min_height: impl Into<Option<Dimension>>) -> Result<(), TreeError> {
        let min_height = min_height.into();
        self.edit(id, |node| node.min_height = min_height)
    }

    pub fn set_max_height(&mut self, id: NodeId, max_height: impl Into<Option<Dimension>>) -> Result<(), TreeError> {
        let max_height = max_height.into();
        self.edit(id, |node| node.max_height = max_height)
    }

    pub fn set_padding(&mut self, id: NodeId, padding: Insets) -> Result<(), TreeError> {
        self.edit(id, |node| node.padding = padding)
    }

    pub fn set_aspect_ratio(&mut self, id: NodeId, ratio: Option<f64>) -> Result<(), TreeError> {
        self.edit(id, |node| node.aspect_ratio = ratio)
    }

    pub fn set_layout_system(
        &mut self,
        id: NodeId,
        system: impl LayoutSystem + 'static,
    ) -> Result<(), TreeError> {
        let system: Rc<dyn LayoutSystem> = Rc::new(system);
        self.edit(id, |node| node.layout_system = system)
    }

    pub fn set_layout_settings(
        &mut self,
        id: NodeId,
        settings: impl Into<LayoutSettings>,
    ) -> Result<(), TreeError> {
        let settings = settings.into();
        self.edit(id, |node| node.layout_settings = settings)
    }

    pub fn set_layout_properties(
        &mut self,
        id: NodeId,
        properties: impl Into<LayoutProperties>,
    ) -> Result<(), TreeError> {
        let properties = properties.into();
        self.edit(id, |node| node.layout_properties = properties)
    }

    /// Apply an arbitrary change to a node's public fields.
    pub fn update(&mut self, id: NodeId, f: impl FnOnce(&mut Node)) -> Result<(), TreeError> {
        self.edit(id, f)
    }

    fn edit(&mut self, id: NodeId, f: impl FnOnce(&mut Node)) -> Result<(), TreeError> {
        self.check_reserved(id)?;
        let node = self.tree.get_mut(id).ok_or(TreeError::UnknownNode { id })?;
        f(node);
        if node.is_attached() {
            self.needs_layout = true;
        }
        Ok(())
    }

    fn check_reserved(&self, id: NodeId) -> Result<(), TreeError> {
        if id == self.sentinel {
            Err(TreeError::ReservedNode { id })
        } else {
            Ok(())
        }
    }

    /// Mark dirty if `id` is part of the laid-out tree.
    fn touch(&mut self, id: NodeId) {
        if self.tree.get(id).is_some_and(Node::is_attached) {
            self.needs_layout = true;
        }
    }

    /// Lay out the whole tree if anything changed since the last run.
    ///
    /// Returns whether a layout ran.
    pub fn compute(&mut self) -> bool {
        if !self.needs_layout {
            return false;
        }
        self.needs_layout = false;

        let (order, resolved, root_size) = {
            let ctx = LayoutContext::new(&self.env, &self.tree);
            let order = self.measure_order();
            let measured = self.measure(&ctx, &order);

            let mut resolved = MeasureMap::with_capacity(measured.len());
            for &id in order.iter().rev() {
                if let Some(node) = self.tree.get(id) {
                    let result = node.layout_system.resolve(&ctx, node, &measured);
                    resolved.insert(id, result);
                }
            }

            let root_size = match (self.tree.get(self.root), resolved.get(&self.root)) {
                (Some(root), Some(measure)) => {
                    system::fit_size(&ctx, root, measure.resolve(Vector2::ZERO), &resolved)
                }
                _ => {
                    system::missing_result("resolve", self.root);
                    Vector2::ZERO
                }
            };
            (order, resolved, root_size)
        };

        let mut results = FinalizedMap::with_capacity(order.len());
        results.insert(self.root, FinalizedResult::new(Vector2::ZERO, root_size));

        let mut stack = vec![(self.sentinel, self.root)];
        while let Some((parent_id, id)) = stack.pop() {
            let Some(result) = results.get(&id).copied() else {
                system::missing_result("finalize", id);
                continue;
            };
            let Some(node) = self.tree.get_mut(id) else {
                continue;
            };
            node.set_placement(result.absolute_position, result.absolute_size);

            let tree = &self.tree;
            let Some(node) = tree.get(id) else {
                continue;
            };
            if let (Some(placer), Some(parent)) = (self.placer.as_mut(), tree.get(parent_id)) {
                placer(&Placement {
                    parent,
                    node,
                    position: result.absolute_position,
                    size: result.absolute_size,
                });
            }

            let ctx = LayoutContext::new(&self.env, tree);
            let children = node.layout_system.finalize(
                &ctx,
                node,
                result.absolute_size,
                result.absolute_position,
                &resolved,
            );
            results.extend(children);
            stack.extend(node.children().iter().rev().map(|&child| (id, child)));
        }

        debug!(
            "Laid out {} nodes, root size {}",
            order.len(),
            root_size
        );
        self.results = results;
        true
    }

    /// Every node under the root, parents first.
    fn measure_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.tree.len());
        let mut seen = HashSet::new();
        let mut stack: SmallVec<[NodeId; 32]> = SmallVec::new();
        stack.push(self.root);
        while let Some(id) = stack.pop() {
            if cfg!(debug_assertions) && !seen.insert(id) {
                panic!("Node {id} reached twice while walking the tree");
            }
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children().iter().rev().copied());
        }
        order
    }

    fn measure(&self, ctx: &LayoutContext<'_>, order: &[NodeId]) -> MeasureMap {
        let mut measured = MeasureMap::with_capacity(order.len());
        measured.insert(self.sentinel, MeasureResult::default());
        for &id in order {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            let parent = node
                .parent()
                .and_then(|parent| measured.get(&parent))
                .copied()
                .unwrap_or_default();
            let result = node.layout_system.measure(ctx, node, &parent);
            measured.insert(id, result);
        }
        measured.remove(&self.sentinel);
        measured
    }
}

//! The layout-system strategy interface.
//!
//! Every node names a [`LayoutSystem`] that arranges its children. The engine
//! calls the four operations in order: `measure` top-down, `resolve`
//! bottom-up, then `finalize` top-down, with `dependent_size` used by parents
//! (and the engine, for the root) whenever a node's size depends on its
//! content.

use std::fmt;

use log::warn;
use tessera_core::{Dimension, NodeId, TextDirection, Vector2};

use crate::absolute::AbsoluteProperties;
use crate::aspect_ratio;
use crate::list::{ListProperties, ListSettings};
use crate::measure::{DependentSize, FinalizedMap, MeasureMap, MeasureResult, ResolvedMeasure, SizeQuery};
use crate::tree::{LayoutTree, Node};

/// Global inputs to a layout run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Environment {
    pub text_direction: TextDirection,
}

impl Environment {
    pub fn new(text_direction: TextDirection) -> Self {
        Self { text_direction }
    }
}

/// What a layout system sees while it runs.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub env: &'a Environment,
    pub tree: &'a LayoutTree,
}

impl<'a> LayoutContext<'a> {
    pub fn new(env: &'a Environment, tree: &'a LayoutTree) -> Self {
        Self { env, tree }
    }

    /// Children of `node`, in order.
    pub fn children(&self, node: &Node) -> impl Iterator<Item = &'a Node> {
        self.tree.children(node.id())
    }

    /// The node's padding box: `(position, size)` inside its padding.
    pub fn content_box(&self, node: &Node, position: Vector2, size: Vector2) -> (Vector2, Vector2) {
        let padding = node.padding.resolve(self.env.text_direction);
        (
            position + Vector2::new(padding.leading, padding.top),
            (size - padding.total()).max(Vector2::ZERO),
        )
    }

    /// Total resolved padding per axis.
    pub fn padding(&self, node: &Node) -> Vector2 {
        node.padding.resolve(self.env.text_direction).total()
    }
}

/// A strategy for sizing a node and placing its children.
pub trait LayoutSystem: fmt::Debug {
    /// Downward pass: the node's own sizing requirements.
    fn measure(&self, ctx: &LayoutContext<'_>, node: &Node, parent: &MeasureResult) -> MeasureResult;

    /// Upward pass: final sizing requirements, children already measured.
    fn resolve(&self, ctx: &LayoutContext<'_>, node: &Node, measured: &MeasureMap) -> MeasureResult;

    /// Downward pass: place each child given the node's final box.
    fn finalize(
        &self,
        ctx: &LayoutContext<'_>,
        node: &Node,
        size: Vector2,
        position: Vector2,
        resolved: &MeasureMap,
    ) -> FinalizedMap;

    /// Content-driven size for the axes `query` leaves open.
    ///
    /// Returns [`DependentSize::NONE`] when both axes are given.
    fn dependent_size(
        &self,
        ctx: &LayoutContext<'_>,
        node: &Node,
        resolved: &MeasureMap,
        query: SizeQuery,
    ) -> DependentSize;
}

/// Settings a node holds for its own layout system.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutSettings {
    /// Use the layout system's defaults
    #[default]
    Default,
    List(ListSettings),
}

impl LayoutSettings {
    /// List settings, or the defaults when none were set.
    pub fn list(&self) -> ListSettings {
        match self {
            LayoutSettings::List(settings) => *settings,
            LayoutSettings::Default => ListSettings::default(),
        }
    }
}

impl From<ListSettings> for LayoutSettings {
    fn from(settings: ListSettings) -> Self {
        LayoutSettings::List(settings)
    }
}

/// How a node asks its parent's layout system to place it.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutProperties {
    /// Use the parent layout system's defaults
    #[default]
    Default,
    Absolute(AbsoluteProperties),
    List(ListProperties),
}

impl LayoutProperties {
    /// Absolute placement, falling back to the default on a mismatch.
    pub fn absolute(&self, id: NodeId) -> AbsoluteProperties {
        match self {
            LayoutProperties::Absolute(properties) => *properties,
            LayoutProperties::Default => AbsoluteProperties::default(),
            other => {
                warn!("Node {} has {:?} under an absolute parent, using defaults", id, other);
                AbsoluteProperties::default()
            }
        }
    }

    /// List placement, falling back to the default item on a mismatch.
    pub fn list(&self, id: NodeId) -> ListProperties {
        match self {
            LayoutProperties::List(properties) => *properties,
            LayoutProperties::Default => ListProperties::default(),
            other => {
                warn!("Node {} has {:?} under a list parent, using defaults", id, other);
                ListProperties::default()
            }
        }
    }
}

impl From<AbsoluteProperties> for LayoutProperties {
    fn from(properties: AbsoluteProperties) -> Self {
        LayoutProperties::Absolute(properties)
    }
}

impl From<ListProperties> for LayoutProperties {
    fn from(properties: ListProperties) -> Self {
        LayoutProperties::List(properties)
    }
}

/// Concrete size of `node` from its resolved bounds.
///
/// Open preferred axes are filled from the node's dependent size, then the
/// aspect ratio (if any) replaces the smallest possible size.
pub fn fit_size(
    ctx: &LayoutContext<'_>,
    node: &Node,
    mut bounds: ResolvedMeasure,
    resolved: &MeasureMap,
) -> Vector2 {
    let dependent = node
        .layout_system
        .dependent_size(ctx, node, resolved, bounds.query());
    bounds.apply(dependent);
    match node.aspect_ratio {
        Some(ratio) => aspect_ratio::solve(ratio, bounds.width, bounds.height, bounds.bounds()),
        None => bounds.smallest_possible_size(),
    }
}

/// Position of a box of `size` anchored at (`x`, `y`) inside `origin`/`area`.
pub fn anchored_position(
    origin: Vector2,
    area: Vector2,
    x: Dimension,
    y: Dimension,
    anchor: Vector2,
    size: Vector2,
) -> Vector2 {
    origin + Vector2::new(x.resolve(area.x), y.resolve(area.y)) - size * anchor
}

/// Dependent size of a node that only contributes its padding.
pub fn padding_size(ctx: &LayoutContext<'_>, node: &Node, query: &SizeQuery) -> DependentSize {
    DependentSize::for_open_axes(query, query.clamp(ctx.padding(node)))
}

/// Look up a child's resolve result, reporting a missing one.
pub(crate) fn resolved_entry<'m>(resolved: &'m MeasureMap, id: NodeId) -> Option<&'m MeasureResult> {
    let entry = resolved.get(&id);
    if entry.is_none() {
        missing_result("resolve", id);
    }
    entry
}

/// Every node reachable from the root is resolved before it is finalized.
pub(crate) fn missing_result(phase: &str, id: NodeId) {
    if cfg!(debug_assertions) {
        panic!("No {phase} result for node {id}");
    }
    warn!("No {} result for node {}, skipping its layout", phase, id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentLayout;
    use tessera_core::Insets;

    #[test]
    fn test_anchored_position() {
        let position = anchored_position(
            Vector2::ZERO,
            Vector2::new(400.0, 400.0),
            Dimension::scale(0.5),
            Dimension::offset(100.0),
            Vector2::new(0.5, 0.5),
            Vector2::new(100.0, 100.0),
        );
        assert_eq!(position, Vector2::new(150.0, 50.0));
    }

    #[test]
    fn test_content_box_mirrors_padding() {
        let mut tree = LayoutTree::new();
        let id = tree.insert(Node::new().with_padding(Insets::new(5.0, 0.0, 10.0, 30.0)));
        let node = tree.get(id).unwrap();

        let ltr = Environment::default();
        let ctx = LayoutContext::new(&ltr, &tree);
        let (origin, area) = ctx.content_box(node, Vector2::ZERO, Vector2::new(100.0, 100.0));
        assert_eq!(origin, Vector2::new(10.0, 5.0));
        assert_eq!(area, Vector2::new(60.0, 95.0));

        let rtl = Environment::new(TextDirection::RightToLeft);
        let ctx = LayoutContext::new(&rtl, &tree);
        let (origin, _) = ctx.content_box(node, Vector2::ZERO, Vector2::new(100.0, 100.0));
        assert_eq!(origin, Vector2::new(30.0, 5.0));
    }

    #[test]
    fn test_content_box_never_negative() {
        let mut tree = LayoutTree::new();
        let id = tree.insert(Node::new().with_padding(Insets::uniform(20.0)));
        let env = Environment::default();
        let ctx = LayoutContext::new(&env, &tree);
        let (_, area) = ctx.content_box(tree.get(id).unwrap(), Vector2::ZERO, Vector2::new(30.0, 50.0));
        assert_eq!(area, Vector2::new(0.0, 10.0));
    }

    #[test]
    fn test_fit_size_fills_from_dependent_size() {
        let mut tree = LayoutTree::new();
        let id = tree.insert(
            Node::new()
                .with_layout_system(ContentLayout::fixed(Vector2::new(80.0, 20.0)))
                .with_width(Dimension::offset(50.0)),
        );
        let env = Environment::default();
        let ctx = LayoutContext::new(&env, &tree);
        let bounds = ResolvedMeasure {
            width: Some(50.0),
            ..Default::default()
        };
        let size = fit_size(&ctx, tree.get(id).unwrap(), bounds, &MeasureMap::new());
        assert_eq!(size, Vector2::new(50.0, 20.0));
    }

    #[test]
    fn test_fit_size_applies_aspect_ratio() {
        let mut tree = LayoutTree::new();
        let id = tree.insert(Node::new().with_aspect_ratio(2.0));
        let env = Environment::default();
        let ctx = LayoutContext::new(&env, &tree);
        let bounds = ResolvedMeasure {
            height: Some(50.0),
            ..Default::default()
        };
        let size = fit_size(&ctx, tree.get(id).unwrap(), bounds, &MeasureMap::new());
        assert_eq!(size, Vector2::new(100.0, 50.0));
    }

    #[test]
    fn test_property_mismatch_falls_back_to_default() {
        let properties = LayoutProperties::List(ListProperties::grow(2.0));
        assert_eq!(properties.absolute(NodeId(1)), AbsoluteProperties::default());

        let properties = LayoutProperties::Absolute(AbsoluteProperties::default());
        assert_eq!(properties.list(NodeId(1)), ListProperties::default());
        assert_eq!(LayoutProperties::Default.list(NodeId(1)), ListProperties::default());
    }

    #[test]
    fn test_settings_default() {
        assert_eq!(LayoutSettings::Default.list(), ListSettings::default());
    }
}

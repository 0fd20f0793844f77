//! Absolute layout: children are pinned to an anchor point inside the parent.

use tessera_core::{Dimension, Vector2};

use crate::measure::{DependentSize, FinalizedMap, FinalizedResult, MeasureMap, MeasureResult, SizeQuery};
use crate::system::{self, LayoutContext, LayoutSystem};
use crate::tree::Node;

/// Where a child sits inside an absolute (or list) parent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsoluteProperties {
    /// Point of the child placed at (`x`, `y`).
    /// (0,0) is the top-left corner, (1,1) is the bottom-right corner.
    pub anchor_point: Vector2,
    /// Horizontal position relative to the parent's padding box
    pub x: Dimension,
    /// Vertical position relative to the parent's padding box
    pub y: Dimension,
}

impl Default for AbsoluteProperties {
    fn default() -> Self {
        Self {
            anchor_point: Vector2::ZERO,
            x: Dimension::ZERO,
            y: Dimension::ZERO,
        }
    }
}

impl AbsoluteProperties {
    pub fn new(anchor_point: Vector2, x: Dimension, y: Dimension) -> Self {
        Self { anchor_point, x, y }
    }

    /// Anchored at the child's center, at the center of the parent.
    pub fn centered() -> Self {
        Self::new(Vector2::splat(0.5), Dimension::scale(0.5), Dimension::scale(0.5))
    }

    pub fn with_anchor_point(mut self, anchor_point: Vector2) -> Self {
        self.anchor_point = anchor_point;
        self
    }

    pub fn with_x(mut self, x: Dimension) -> Self {
        self.x = x;
        self
    }

    pub fn with_y(mut self, y: Dimension) -> Self {
        self.y = y;
        self
    }

    /// Place a child of `size` inside the padding box `origin`/`area`.
    pub fn place(&self, origin: Vector2, area: Vector2, size: Vector2) -> Vector2 {
        system::anchored_position(origin, area, self.x, self.y, self.anchor_point, size)
    }
}

/// Free positioning. Children never affect the parent's size.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteLayout;

impl LayoutSystem for AbsoluteLayout {
    fn measure(&self, _ctx: &LayoutContext<'_>, node: &Node, _parent: &MeasureResult) -> MeasureResult {
        MeasureResult::declared(node)
    }

    fn resolve(&self, _ctx: &LayoutContext<'_>, node: &Node, _measured: &MeasureMap) -> MeasureResult {
        MeasureResult::declared(node)
    }

    fn finalize(
        &self,
        ctx: &LayoutContext<'_>,
        node: &Node,
        size: Vector2,
        position: Vector2,
        resolved: &MeasureMap,
    ) -> FinalizedMap {
        let (origin, area) = ctx.content_box(node, position, size);
        let mut results = FinalizedMap::with_capacity(node.children().len());

        for child in ctx.children(node) {
            let Some(measure) = system::resolved_entry(resolved, child.id()) else {
                continue;
            };
            let properties = child.layout_properties.absolute(child.id());
            let child_size = system::fit_size(ctx, child, measure.resolve(area), resolved);
            results.insert(
                child.id(),
                FinalizedResult::new(properties.place(origin, area, child_size), child_size),
            );
        }
        results
    }

    fn dependent_size(
        &self,
        ctx: &LayoutContext<'_>,
        node: &Node,
        _resolved: &MeasureMap,
        query: SizeQuery,
    ) -> DependentSize {
        system::padding_size(ctx, node, &query)
    }
}

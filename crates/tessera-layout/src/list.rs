//! List layout: a single row or column of children with flex grow and shrink.
//!
//! Children with [`ListProperties::Item`] flow along the main axis. Children
//! with [`ListProperties::Absolute`] are pinned inside the padding box like in
//! [`AbsoluteLayout`](crate::AbsoluteLayout) and take no part in
//! sizing.

use log::trace;
use smallvec::SmallVec;
use tessera_core::{Dimension, TextDirection, Vector2};

use crate::absolute::AbsoluteProperties;
use crate::aspect_ratio;
use crate::measure::{
    DependentSize, FinalizedMap, FinalizedResult, MeasureMap, MeasureResult, ResolvedMeasure,
    SizeQuery,
};
use crate::system::{self, LayoutContext, LayoutSystem};
use crate::tree::Node;

/// Flow direction of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListDirection {
    /// Left to right
    #[default]
    Horizontal,
    /// Right to left
    HorizontalReverse,
    /// Along the text direction
    HorizontalFollowingLocale,
    /// Against the text direction
    HorizontalOpposingLocale,
    /// Top to bottom
    Vertical,
    /// Bottom to top
    VerticalReverse,
}

impl ListDirection {
    pub fn is_horizontal(self) -> bool {
        !matches!(self, ListDirection::Vertical | ListDirection::VerticalReverse)
    }

    /// Whether children are laid out from the far end of the main axis.
    pub fn is_reversed(self, text_direction: TextDirection) -> bool {
        match self {
            ListDirection::Horizontal | ListDirection::Vertical => false,
            ListDirection::HorizontalReverse | ListDirection::VerticalReverse => true,
            ListDirection::HorizontalFollowingLocale => text_direction.is_rtl(),
            ListDirection::HorizontalOpposingLocale => !text_direction.is_rtl(),
        }
    }
}

/// How free space along the main axis is distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MainAxisDistribution {
    #[default]
    Start,
    Center,
    End,
    /// Free space between items, none at the ends
    SpaceBetween,
    /// Equal space around each item, half at the ends
    SpaceAround,
    /// Equal space between items and at the ends
    SpaceEvenly,
}

/// Distribution of lines along the cross axis.
///
/// Lists never wrap, so this has no effect yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrossAxisDistribution {
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
    #[default]
    Stretch,
}

/// Placement of an item across the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrossAxisAlignment {
    Start,
    Center,
    End,
    /// Fill the cross axis, within the item's own bounds
    #[default]
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WrapMode {
    #[default]
    NoWrap,
}

/// Settings of a list container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListSettings {
    pub direction: ListDirection,
    /// Minimum gap between items in pixels
    pub spacing: f64,
    pub main_axis_distribution: MainAxisDistribution,
    pub cross_axis_distribution: CrossAxisDistribution,
    pub cross_axis_alignment: CrossAxisAlignment,
    pub wrap_mode: WrapMode,
}

impl ListSettings {
    pub fn new(direction: ListDirection) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    pub fn horizontal() -> Self {
        Self::new(ListDirection::Horizontal)
    }

    pub fn vertical() -> Self {
        Self::new(ListDirection::Vertical)
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_main_axis_distribution(mut self, distribution: MainAxisDistribution) -> Self {
        self.main_axis_distribution = distribution;
        self
    }

    pub fn with_cross_axis_distribution(mut self, distribution: CrossAxisDistribution) -> Self {
        self.cross_axis_distribution = distribution;
        self
    }

    pub fn with_cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }
}

/// Flex parameters of a list item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemProperties {
    /// Share of free space taken when the list has room to spare
    pub grow: f64,
    /// Share of overflow absorbed when the list is too small
    pub shrink: f64,
    /// Overrides the list's cross-axis alignment
    pub cross_axis_alignment: Option<CrossAxisAlignment>,
}

impl Default for ItemProperties {
    fn default() -> Self {
        Self {
            grow: 0.0,
            shrink: 1.0,
            cross_axis_alignment: None,
        }
    }
}

impl ItemProperties {
    pub fn with_grow(mut self, grow: f64) -> Self {
        self.grow = grow;
        self
    }

    pub fn with_shrink(mut self, shrink: f64) -> Self {
        self.shrink = shrink;
        self
    }

    pub fn with_cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = Some(alignment);
        self
    }
}

/// How a child of a list is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListProperties {
    /// Flows with the other items
    Item(ItemProperties),
    /// Pinned inside the padding box, outside the flow
    Absolute(AbsoluteProperties),
}

impl Default for ListProperties {
    fn default() -> Self {
        ListProperties::Item(ItemProperties::default())
    }
}

impl ListProperties {
    /// An item with the given grow factor.
    pub fn grow(grow: f64) -> Self {
        ListProperties::Item(ItemProperties::default().with_grow(grow))
    }

    /// An item with the given shrink factor.
    pub fn shrink(shrink: f64) -> Self {
        ListProperties::Item(ItemProperties::default().with_shrink(shrink))
    }

    pub fn absolute(anchor_point: Vector2, x: Dimension, y: Dimension) -> Self {
        ListProperties::Absolute(AbsoluteProperties::new(anchor_point, x, y))
    }
}

impl From<ItemProperties> for ListProperties {
    fn from(properties: ItemProperties) -> Self {
        ListProperties::Item(properties)
    }
}

/// Maps between (x, y) and (main, cross).
#[derive(Debug, Clone, Copy)]
struct Axes {
    horizontal: bool,
}

impl Axes {
    fn main(self, v: Vector2) -> f64 {
        if self.horizontal {
            v.x
        } else {
            v.y
        }
    }

    fn cross(self, v: Vector2) -> f64 {
        if self.horizontal {
            v.y
        } else {
            v.x
        }
    }

    fn pack(self, main: f64, cross: f64) -> Vector2 {
        if self.horizontal {
            Vector2::new(main, cross)
        } else {
            Vector2::new(cross, main)
        }
    }
}

struct FlexItem<'a> {
    node: &'a Node,
    /// Bounds resolved against the content box
    bounds: ResolvedMeasure,
    properties: ItemProperties,
    size: Vector2,
}

impl<'a> FlexItem<'a> {
    fn new(node: &'a Node, bounds: ResolvedMeasure, properties: ItemProperties) -> Self {
        Self {
            node,
            bounds,
            properties,
            size: Vector2::ZERO,
        }
    }
}

type FlexItems<'a> = SmallVec<[FlexItem<'a>; 8]>;

/// Row or column layout with flexbox-style grow and shrink.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListLayout;

impl ListLayout {
    /// Size every item and return the list's outer size.
    ///
    /// `query` carries the list's outer constraints; padding is removed here.
    /// When the main axis is neither given nor overflowing, items keep their
    /// natural sizes and the result is content-driven.
    fn calculate_flex(
        &self,
        ctx: &LayoutContext<'_>,
        node: &Node,
        settings: &ListSettings,
        items: &mut [FlexItem<'_>],
        resolved: &MeasureMap,
        query: &SizeQuery,
    ) -> Vector2 {
        let axes = Axes {
            horizontal: settings.direction.is_horizontal(),
        };
        let padding = ctx.padding(node);
        let spacing = settings.spacing.max(0.0);
        let given_main = if axes.horizontal { query.width } else { query.height };
        let available = given_main.unwrap_or(axes.main(query.max())) - axes.main(padding);

        let mut fixed = given_main.is_some();
        let mut used = 0.0;
        let mut total_grow = 0.0;
        let mut total_shrink = 0.0;
        for (index, item) in items.iter_mut().enumerate() {
            total_grow += item.properties.grow.max(0.0);
            total_shrink += item.properties.shrink.max(0.0);
            item.size = system::fit_size(ctx, item.node, item.bounds, resolved);

            let gap = if index == 0 { 0.0 } else { spacing };
            let main = axes.main(item.size);
            if used + gap + main > available {
                fixed = true;
            }
            used += gap + main;
        }

        if fixed {
            let remaining = available - used;
            if remaining < 0.0 && total_shrink > 0.0 {
                self.flex(ctx, axes, items, resolved, remaining, total_shrink, |p| p.shrink);
            } else if remaining > 0.0 && total_grow > 0.0 {
                self.flex(ctx, axes, items, resolved, remaining, total_grow, |p| p.grow);
            }
        }

        let main: f64 = items.iter().map(|item| axes.main(item.size)).sum::<f64>()
            + spacing * items.len().saturating_sub(1) as f64;
        let cross = items
            .iter()
            .map(|item| axes.cross(item.size))
            .fold(0.0, f64::max);
        query.clamp(axes.pack(main, cross) + padding)
    }

    /// Hand `remaining` space out to the items, freezing those that hit a limit.
    ///
    /// Each round gives every unfrozen item its share of the remaining space.
    /// An item whose achievable size differs from its share freezes and stops
    /// receiving space; the loop ends when a round freezes nothing.
    #[allow(clippy::too_many_arguments)]
    fn flex(
        &self,
        ctx: &LayoutContext<'_>,
        axes: Axes,
        items: &mut [FlexItem<'_>],
        resolved: &MeasureMap,
        mut remaining: f64,
        mut total: f64,
        factor: impl Fn(&ItemProperties) -> f64,
    ) {
        let growing = remaining > 0.0;
        let mut frozen: SmallVec<[bool; 8]> = items
            .iter()
            .map(|item| factor(&item.properties) <= 0.0)
            .collect();

        for round in 0..=items.len() {
            let open = if growing { remaining > 0.0 } else { remaining < 0.0 };
            if !open || frozen.iter().all(|&f| f) {
                break;
            }

            let mut delta = 0.0;
            let mut released = 0.0;
            let mut newly_frozen = 0;
            for (item, is_frozen) in items.iter_mut().zip(frozen.iter_mut()) {
                if *is_frozen {
                    continue;
                }
                let weight = factor(&item.properties).max(0.0);
                let current = axes.main(item.size);
                let target = current + remaining * weight / total;
                let achieved = self.resize(ctx, axes, item, target, resolved);
                if achieved != target {
                    *is_frozen = true;
                    released += weight;
                    newly_frozen += 1;
                }
                delta += achieved - current;
            }

            trace!(
                "Flex round {}: remaining {}, factor total {}, froze {}",
                round,
                remaining,
                total,
                newly_frozen
            );
            remaining -= delta;
            total -= released;
            if newly_frozen == 0 {
                break;
            }
        }
    }

    /// Resize an item towards `target` along the main axis and return the
    /// main size it actually takes.
    fn resize(
        &self,
        ctx: &LayoutContext<'_>,
        axes: Axes,
        item: &mut FlexItem<'_>,
        target: f64,
        resolved: &MeasureMap,
    ) -> f64 {
        let bounds = item.bounds.bounds();
        let clamped = target.min(axes.main(bounds.max)).max(axes.main(bounds.min));
        let cross = axes.cross(item.size);
        let offered = axes.pack(clamped, cross);

        let query = SizeQuery {
            width: Some(offered.x),
            height: Some(offered.y),
            ..item.bounds.query()
        };
        let dependent = item
            .node
            .layout_system
            .dependent_size(ctx, item.node, resolved, query);
        let smallest = item.bounds.smallest_possible_size();
        let mut size = if axes.horizontal {
            Vector2::new(
                dependent.width.unwrap_or(clamped),
                dependent.height.unwrap_or(smallest.y),
            )
        } else {
            Vector2::new(
                dependent.width.unwrap_or(smallest.x),
                dependent.height.unwrap_or(clamped),
            )
        };

        if let Some(ratio) = item.node.aspect_ratio {
            let mut limits = bounds;
            if axes.horizontal {
                limits.max = Vector2::new(clamped.min(bounds.max.x), cross);
            } else {
                limits.max = Vector2::new(cross, clamped.min(bounds.max.y));
            }
            size = aspect_ratio::solve(ratio, Some(offered.x), Some(offered.y), limits);
        }

        let achieved = axes.main(size).min(clamped);
        item.size = axes.pack(achieved, axes.cross(size));
        achieved
    }
}

/// Leading offset and gap for `count` items leaving `free` space on the main axis.
fn distribute(
    distribution: MainAxisDistribution,
    free: f64,
    count: usize,
    spacing: f64,
    reversed: bool,
) -> (f64, f64) {
    if count == 0 {
        return (0.0, spacing);
    }
    let n = count as f64;
    let gaps = (count - 1) as f64;
    let leftover = free - gaps * spacing;
    match distribution {
        MainAxisDistribution::Start => (if reversed { leftover } else { 0.0 }, spacing),
        MainAxisDistribution::Center => (leftover / 2.0, spacing),
        MainAxisDistribution::End => (if reversed { 0.0 } else { leftover }, spacing),
        MainAxisDistribution::SpaceBetween => {
            let gap = if count > 1 { spacing.max(free / gaps) } else { 0.0 };
            (if reversed { free - gap * gaps } else { 0.0 }, gap)
        }
        MainAxisDistribution::SpaceAround => {
            let gap = spacing.max(free / n);
            let edge = (free / (2.0 * n)).max(0.0);
            (if reversed { free - gap * gaps - edge } else { edge }, gap)
        }
        MainAxisDistribution::SpaceEvenly => {
            let gap = spacing.max(free / (n + 1.0));
            let edge = (free / (n + 1.0)).max(0.0);
            (if reversed { free - gap * gaps - edge } else { edge }, gap)
        }
    }
}

/// Resolve one axis of a child's bounds for dependent sizing.
///
/// A given extent resolves everything against it (minus padding). On an open
/// axis only dimensions with a literal offset resolve (against zero); the rest
/// are unconstrained.
fn resolve_axis(
    given: Option<f64>,
    padding: f64,
    preferred: Option<Dimension>,
    min: Dimension,
    max: Dimension,
) -> (Option<f64>, f64, f64) {
    match given {
        Some(extent) => {
            let extent = (extent - padding).max(0.0);
            (
                preferred.map(|d| d.resolve(extent)),
                min.resolve(extent),
                max.resolve(extent),
            )
        }
        None => (
            preferred.filter(Dimension::has_offset).map(|d| d.resolve(0.0)),
            if min.has_offset() { min.resolve(0.0) } else { 0.0 },
            if max.has_offset() { max.resolve(0.0) } else { f64::INFINITY },
        ),
    }
}

impl LayoutSystem for ListLayout {
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
        let settings = node.layout_settings.list();
        let axes = Axes {
            horizontal: settings.direction.is_horizontal(),
        };
        let reversed = settings.direction.is_reversed(ctx.env.text_direction);
        let (origin, area) = ctx.content_box(node, position, size);
        let mut results = FinalizedMap::with_capacity(node.children().len());

        let mut items = FlexItems::new();
        for child in ctx.children(node) {
            let Some(measure) = system::resolved_entry(resolved, child.id()) else {
                continue;
            };
            let bounds = measure.resolve(area);
            match child.layout_properties.list(child.id()) {
                ListProperties::Item(properties) => {
                    items.push(FlexItem::new(child, bounds, properties));
                }
                ListProperties::Absolute(properties) => {
                    let child_size = system::fit_size(ctx, child, bounds, resolved);
                    results.insert(
                        child.id(),
                        FinalizedResult::new(properties.place(origin, area, child_size), child_size),
                    );
                }
            }
        }

        self.calculate_flex(ctx, node, &settings, &mut items, resolved, &SizeQuery::exact(size));

        let used: f64 = items.iter().map(|item| axes.main(item.size)).sum();
        let (mut offset, gap) = distribute(
            settings.main_axis_distribution,
            axes.main(area) - used,
            items.len(),
            settings.spacing.max(0.0),
            reversed,
        );

        let cross_extent = axes.cross(area);
        let mut place = |item: &FlexItem<'_>| {
            let alignment = item
                .properties
                .cross_axis_alignment
                .unwrap_or(settings.cross_axis_alignment);
            let main = axes.main(item.size);
            let mut cross = axes.cross(item.size);
            let cross_offset = match alignment {
                CrossAxisAlignment::Start => 0.0,
                CrossAxisAlignment::Center => (cross_extent - cross) / 2.0,
                CrossAxisAlignment::End => cross_extent - cross,
                CrossAxisAlignment::Stretch => {
                    let bounds = item.bounds.bounds();
                    cross = cross_extent
                        .min(axes.cross(bounds.max))
                        .max(axes.cross(bounds.min));
                    0.0
                }
            };
            results.insert(
                item.node.id(),
                FinalizedResult::new(
                    origin + axes.pack(offset, cross_offset),
                    axes.pack(main, cross),
                ),
            );
            offset += main + gap;
        };
        if reversed {
            items.iter().rev().for_each(&mut place);
        } else {
            items.iter().for_each(&mut place);
        }

        results
    }

    fn dependent_size(
        &self,
        ctx: &LayoutContext<'_>,
        node: &Node,
        resolved: &MeasureMap,
        query: SizeQuery,
    ) -> DependentSize {
        if query.is_fixed() {
            return DependentSize::NONE;
        }
        let padding = ctx.padding(node);

        let mut items = FlexItems::new();
        for child in ctx.children(node) {
            let Some(measure) = system::resolved_entry(resolved, child.id()) else {
                continue;
            };
            let ListProperties::Item(properties) = child.layout_properties.list(child.id()) else {
                continue;
            };
            let (width, min_width, max_width) = resolve_axis(
                query.width,
                padding.x,
                measure.width,
                measure.min_width,
                measure.max_width,
            );
            let (height, min_height, max_height) = resolve_axis(
                query.height,
                padding.y,
                measure.height,
                measure.min_height,
                measure.max_height,
            );
            let bounds = ResolvedMeasure {
                min_width,
                max_width,
                width,
                min_height,
                max_height,
                height,
            };
            items.push(FlexItem::new(child, bounds, properties));
        }

        if items.is_empty() {
            return system::padding_size(ctx, node, &query);
        }
        let settings = node.layout_settings.list();
        let size = self.calculate_flex(ctx, node, &settings, &mut items, resolved, &query);
        DependentSize::for_open_axes(&query, size)
    }
}

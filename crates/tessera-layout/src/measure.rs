//! Sizing data passed between the layout passes.

use std::collections::HashMap;

use indexmap::IndexMap;
use tessera_core::{Dimension, NodeId, Vector2};

use crate::aspect_ratio::SizeBounds;
use crate::tree::Node;

/// Measure (and resolve) results keyed by node.
pub type MeasureMap = HashMap<NodeId, MeasureResult>;

/// Finalized child boxes keyed by node, in placement order.
pub type FinalizedMap = IndexMap<NodeId, FinalizedResult>;

/// Parent-relative sizing of a node.
///
/// Bounds are always present (`0` and `∞` when undeclared); the preferred
/// width and height are optional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureResult {
    pub min_width: Dimension,
    pub max_width: Dimension,
    pub width: Option<Dimension>,
    pub min_height: Dimension,
    pub max_height: Dimension,
    pub height: Option<Dimension>,
}

impl Default for MeasureResult {
    fn default() -> Self {
        Self {
            min_width: Dimension::ZERO,
            max_width: Dimension::offset(f64::INFINITY),
            width: None,
            min_height: Dimension::ZERO,
            max_height: Dimension::offset(f64::INFINITY),
            height: None,
        }
    }
}

impl MeasureResult {
    /// The sizes a node declares for itself.
    pub fn declared(node: &Node) -> Self {
        let defaults = Self::default();
        Self {
            min_width: node.min_width.unwrap_or(defaults.min_width),
            max_width: node.max_width.unwrap_or(defaults.max_width),
            width: node.width,
            min_height: node.min_height.unwrap_or(defaults.min_height),
            max_height: node.max_height.unwrap_or(defaults.max_height),
            height: node.height,
        }
    }

    /// Resolve every dimension against a concrete parent size.
    pub fn resolve(&self, parent_size: Vector2) -> ResolvedMeasure {
        ResolvedMeasure {
            min_width: self.min_width.resolve(parent_size.x),
            max_width: self.max_width.resolve(parent_size.x),
            width: self.width.map(|w| w.resolve(parent_size.x)),
            min_height: self.min_height.resolve(parent_size.y),
            max_height: self.max_height.resolve(parent_size.y),
            height: self.height.map(|h| h.resolve(parent_size.y)),
        }
    }
}

/// A [`MeasureResult`] resolved to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMeasure {
    pub min_width: f64,
    pub max_width: f64,
    pub width: Option<f64>,
    pub min_height: f64,
    pub max_height: f64,
    pub height: Option<f64>,
}

impl Default for ResolvedMeasure {
    fn default() -> Self {
        Self {
            min_width: 0.0,
            max_width: f64::INFINITY,
            width: None,
            min_height: 0.0,
            max_height: f64::INFINITY,
            height: None,
        }
    }
}

impl ResolvedMeasure {
    /// Preferred size (or zero) clamped into the bounds, never negative.
    pub fn smallest_possible_size(&self) -> Vector2 {
        Vector2::new(
            self.min_width
                .max(self.width.unwrap_or(0.0).min(self.max_width))
                .max(0.0),
            self.min_height
                .max(self.height.unwrap_or(0.0).min(self.max_height))
                .max(0.0),
        )
    }

    /// The min/max box as a pair of vectors.
    pub fn bounds(&self) -> SizeBounds {
        SizeBounds {
            min: Vector2::new(self.min_width, self.min_height),
            max: Vector2::new(self.max_width, self.max_height),
        }
    }

    /// A dependent-size query carrying every resolved value.
    pub fn query(&self) -> SizeQuery {
        SizeQuery {
            width: self.width,
            height: self.height,
            min_width: Some(self.min_width),
            min_height: Some(self.min_height),
            max_width: Some(self.max_width),
            max_height: Some(self.max_height),
        }
    }

    /// Fill the preferred axes a dependent-size answer provides.
    pub fn apply(&mut self, dependent: DependentSize) {
        self.width = dependent.width.or(self.width);
        self.height = dependent.height.or(self.height);
    }
}

/// The terminal layout of one node, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FinalizedResult {
    pub absolute_position: Vector2,
    pub absolute_size: Vector2,
}

impl FinalizedResult {
    pub fn new(absolute_position: Vector2, absolute_size: Vector2) -> Self {
        Self {
            absolute_position,
            absolute_size,
        }
    }
}

/// Room offered to a node when asking for its content-driven size.
///
/// `None` for `width` / `height` marks an open axis; `None` bounds mean
/// `0` / `∞`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
}

impl SizeQuery {
    /// A query pinning both axes and all bounds to `size`.
    pub fn exact(size: Vector2) -> Self {
        Self {
            width: Some(size.x),
            height: Some(size.y),
            min_width: Some(size.x),
            min_height: Some(size.y),
            max_width: Some(size.x),
            max_height: Some(size.y),
        }
    }

    /// Whether both axes are already given.
    pub fn is_fixed(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    pub fn min(&self) -> Vector2 {
        Vector2::new(
            self.min_width.unwrap_or(0.0),
            self.min_height.unwrap_or(0.0),
        )
    }

    pub fn max(&self) -> Vector2 {
        Vector2::new(
            self.max_width.unwrap_or(f64::INFINITY),
            self.max_height.unwrap_or(f64::INFINITY),
        )
    }

    /// Clamp `size` into the query bounds.
    pub fn clamp(&self, size: Vector2) -> Vector2 {
        size.min(self.max()).max(self.min())
    }
}

/// Answer to a [`SizeQuery`]: a size per axis the node could compute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DependentSize {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl DependentSize {
    /// Nothing to contribute.
    pub const NONE: DependentSize = DependentSize {
        width: None,
        height: None,
    };

    pub fn new(width: Option<f64>, height: Option<f64>) -> Self {
        Self { width, height }
    }

    /// Report `size` for the axes `query` left open.
    pub fn for_open_axes(query: &SizeQuery, size: Vector2) -> Self {
        Self {
            width: query.width.is_none().then_some(size.x),
            height: query.height.is_none().then_some(size.y),
        }
    }
}

//! Box layout for Tessera node trees.
//!
//! This crate computes the absolute position and size of every node in a
//! tree from declarative sizing rules: parent-relative [`Dimension`]s,
//! min/max bounds, padding and aspect ratios.
//!
//! # Architecture
//!
//! 1. **Tree**: nodes live in a [`LayoutTree`] arena, linked by [`NodeId`]
//! 2. **Layout systems**: each node names a [`LayoutSystem`] that places its
//!    children ([`AbsoluteLayout`], [`ListLayout`] or [`ContentLayout`])
//! 3. **Engine**: [`LayoutEngine`] runs measure, resolve and finalize over
//!    the tree whenever it is dirty
//!
//! # Example
//!
//! ```
//! use tessera_layout::{LayoutEngine, ListLayout, ListProperties, ListSettings, Node};
//!
//! let mut engine = LayoutEngine::new();
//! let root = engine.insert(
//!     Node::new()
//!         .with_size(600.0, 100.0)
//!         .with_layout_system(ListLayout)
//!         .with_layout_settings(ListSettings::horizontal()),
//! );
//! engine.set_root(root).unwrap();
//!
//! let sidebar = engine.insert(Node::new().with_size(200.0, 100.0));
//! let main = engine.insert(
//!     Node::new()
//!         .with_size(0.0, 100.0)
//!         .with_layout_properties(ListProperties::grow(1.0)),
//! );
//! engine.add_child(root, sidebar).unwrap();
//! engine.add_child(root, main).unwrap();
//!
//! engine.compute();
//! let main = engine.node(main).unwrap();
//! assert_eq!(main.absolute_position().x, 200.0);
//! assert_eq!(main.absolute_size().x, 400.0);
//! ```

mod absolute;
mod aspect_ratio;
mod content;
mod engine;
mod list;
mod measure;
mod system;
mod tree;

pub use absolute::{AbsoluteLayout, AbsoluteProperties};
pub use aspect_ratio::{solve as solve_aspect_ratio, SizeBounds};
pub use content::{ContentLayout, IntrinsicSize};
pub use engine::{LayoutEngine, Placement};
pub use list::{
    CrossAxisAlignment, CrossAxisDistribution, ItemProperties, ListDirection, ListLayout,
    ListProperties, ListSettings, MainAxisDistribution, WrapMode,
};
pub use measure::{
    DependentSize, FinalizedMap, FinalizedResult, MeasureMap, MeasureResult, ResolvedMeasure,
    SizeQuery,
};
pub use system::{
    anchored_position, fit_size, padding_size, Environment, LayoutContext, LayoutProperties,
    LayoutSettings, LayoutSystem,
};
pub use tree::{LayoutTree, Node};

pub use tessera_core::{Dimension, Insets, NodeId, TextDirection, TreeError, Vector2};

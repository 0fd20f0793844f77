//! Core value types shared by the Tessera layout crates.
//!
//! - [`Dimension`]: a parent-relative scale plus an absolute offset
//! - [`Insets`]: direction-aware padding
//! - [`Vector2`], [`NodeId`], [`TextDirection`]
//! - [`TreeError`]: errors for structural tree edits

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;

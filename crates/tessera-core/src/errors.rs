//! Error types for structural tree mutations.

use crate::types::NodeId;
use thiserror::Error;

/// Errors raised when editing the node tree.
///
/// Layout computation itself never fails; only structural edits are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Unknown node {id}")]
    UnknownNode { id: NodeId },

    #[error("Node {child} already has parent {parent}")]
    AlreadyParented { child: NodeId, parent: NodeId },

    #[error("Adding {child} under {parent} would create a cycle")]
    WouldCreateCycle { parent: NodeId, child: NodeId },

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Child index {index} out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Node {id} is reserved by the layout engine")]
    ReservedNode { id: NodeId },
}

//! Error types for the document model

use crate::BlockId;
use thiserror::Error;

/// A broken tree invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("Root block is missing")]
    MissingRoot,

    #[error("Root block is referenced as a child of {parent}")]
    RootReferenced { parent: BlockId },

    #[error("Block {parent} references missing child {child}")]
    DanglingChild { parent: BlockId, child: BlockId },

    #[error("Block {parent} lists child {child} more than once")]
    DuplicateChild { parent: BlockId, child: BlockId },

    #[error("Block {child} has two parents: {first} and {second}")]
    MultipleParents {
        child: BlockId,
        first: BlockId,
        second: BlockId,
    },

    #[error("Block {0} is its own ancestor")]
    Cycle(BlockId),

    #[error("Block {0} is not reachable from the root")]
    Orphan(BlockId),

    #[error("Block {id} has children lists that do not fit kind {kind}")]
    SlotShape { id: BlockId, kind: String },

    #[error("Block {id} has no children list {slot}")]
    MissingSlot { id: BlockId, slot: usize },

    #[error("Block id {0} is already taken")]
    DuplicateId(BlockId),

    #[error("Root block cannot be moved or removed")]
    RootDetached,
}

/// Failure to read a document from its JSON form
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document must be a JSON object keyed by block id")]
    NotAnObject,

    #[error("Document has no \"root\" block")]
    MissingRoot,

    #[error("Block {id}: {reason}")]
    InvalidBlock { id: BlockId, reason: String },

    #[error("Block {id} has unknown type {kind:?}")]
    UnknownKind { id: BlockId, kind: String },

    #[error("Document tree is inconsistent: {0}")]
    Invariant(#[from] Violation),
}

impl ImportError {
    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        ImportError::InvalidBlock {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

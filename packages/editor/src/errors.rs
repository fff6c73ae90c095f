//! Error types for the editor

use maildraft_document::{ImportError, Violation};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(#[from] Violation),

    #[error("Unknown block id: {0}")]
    UnknownBlockId(String),

    #[error("Drop target is not valid for the dragged block")]
    InvalidDropTarget,

    #[error("Import failed: {0}")]
    ImportSchema(#[from] ImportError),

    #[error("Invalid editor config: {0}")]
    Config(String),
}

impl EditorError {
    pub(crate) fn unknown(id: &str) -> Self {
        EditorError::UnknownBlockId(id.to_string())
    }
}

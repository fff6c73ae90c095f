//! # Undo/Redo Stack
//!
//! Tracks committed edits and enables undo/redo.
//!
//! ## Design
//!
//! - Each entry holds the forward patch and its inverse, both derived by
//!   diffing the snapshots around the edit
//! - Undo applies the inverse and moves the entry to the redo stack
//! - Redo reapplies the forward patch
//! - New edits clear the redo stack
//! - Batches group several edits into one undo step
//!
//! Both directions go through [`DocumentStore::apply_patch`], so an entry
//! that no longer fits the document is refused instead of corrupting it.

use std::sync::Arc;

use maildraft_document::Document;

use crate::{DocumentStore, EditorError, Patch};

/// Default number of undo levels kept
pub const DEFAULT_UNDO_LEVELS: usize = 100;

/// One undo step
#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub patch: Patch,
    pub inverse: Patch,
    pub description: Option<String>,
}

impl UndoEntry {
    /// Entry taking `before` to `after`
    pub fn between(before: &Document, after: &Document) -> Self {
        Self {
            patch: Patch::diff(before, after),
            inverse: Patch::diff(after, before),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Default)]
struct PendingBatch {
    /// Snapshot before the first edit of the batch
    before: Option<Arc<Document>>,
    /// Snapshot after the latest edit
    after: Option<Arc<Document>>,
    description: Option<String>,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Applied entries (most recent last)
    undo_stack: Vec<UndoEntry>,

    /// Undone entries (most recent last)
    redo_stack: Vec<UndoEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    current_batch: Option<PendingBatch>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_UNDO_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record a committed edit
    pub fn record(&mut self, before: &Arc<Document>, after: &Arc<Document>) {
        if Arc::ptr_eq(before, after) {
            return;
        }

        if let Some(batch) = &mut self.current_batch {
            batch.before.get_or_insert_with(|| Arc::clone(before));
            batch.after = Some(Arc::clone(after));
        } else {
            let entry = UndoEntry::between(before, after);
            if !entry.patch.is_empty() {
                self.push_entry(entry);
            }
        }
    }

    /// Start a batch of edits (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.end_batch();
        self.current_batch = Some(PendingBatch::default());
    }

    /// End the current batch and push it to the undo stack
    pub fn end_batch(&mut self) {
        let Some(batch) = self.current_batch.take() else {
            return;
        };

        if let (Some(before), Some(after)) = (batch.before, batch.after) {
            let mut entry = UndoEntry::between(&before, &after);
            entry.description = batch.description;
            if !entry.patch.is_empty() {
                self.push_entry(entry);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    fn push_entry(&mut self, entry: UndoEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New edit invalidates the redo branch
        self.redo_stack.clear();
    }

    /// Undo the most recent entry. An open batch is closed first.
    pub fn undo(&mut self, store: &mut DocumentStore) -> Result<bool, EditorError> {
        self.end_batch();

        let Some(entry) = self.undo_stack.pop() else {
            return Ok(false);
        };

        match store.apply_patch(entry.inverse.clone()) {
            Ok(_) => {
                self.redo_stack.push(entry);
                Ok(true)
            }
            Err(err) => {
                self.undo_stack.push(entry);
                Err(err)
            }
        }
    }

    /// Redo the most recently undone entry
    pub fn redo(&mut self, store: &mut DocumentStore) -> Result<bool, EditorError> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(false);
        };

        match store.apply_patch(entry.patch.clone()) {
            Ok(_) => {
                self.undo_stack.push(entry);
                Ok(true)
            }
            Err(err) => {
                self.redo_stack.push(entry);
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

//! # Patches
//!
//! A patch is the unit of change accepted by the [`DocumentStore`]: a set of
//! whole-record replacements and deletions keyed by block id, applied
//! all-or-nothing. Records are never merged field by field.
//!
//! [`DocumentStore`]: crate::DocumentStore

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::Arc;

use maildraft_document::json::{block_from_json, block_to_json};
use maildraft_document::{Block, BlockId, Document, ImportError};
use serde_json::{Map, Value};

use crate::EditorError;

/// New value for one block id
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Insert or replace the record
    Upsert(Arc<Block>),

    /// Delete the record
    Tombstone,
}

/// Batch of block insertions, replacements and deletions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    changes: BTreeMap<BlockId, Change>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(mut self, id: impl Into<BlockId>, block: Block) -> Self {
        self.set_upsert(id, block);
        self
    }

    pub fn tombstone(mut self, id: impl Into<BlockId>) -> Self {
        self.set_tombstone(id);
        self
    }

    pub fn set_upsert(&mut self, id: impl Into<BlockId>, block: Block) {
        self.changes.insert(id.into(), Change::Upsert(Arc::new(block)));
    }

    pub fn set_tombstone(&mut self, id: impl Into<BlockId>) {
        self.changes.insert(id.into(), Change::Tombstone);
    }

    pub fn get(&self, id: &str) -> Option<&Change> {
        self.changes.get(id)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, BlockId, Change> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Patch turning `from` into `to`.
    ///
    /// Records shared between both documents are skipped without comparing
    /// their contents.
    pub fn diff(from: &Document, to: &Document) -> Self {
        let mut changes = BTreeMap::new();

        for (id, block) in to.shared_blocks() {
            let unchanged = from
                .get_shared(id)
                .map_or(false, |old| Arc::ptr_eq(old, block) || old == block);
            if !unchanged {
                changes.insert(id.clone(), Change::Upsert(Arc::clone(block)));
            }
        }

        for id in from.ids() {
            if !to.contains(id) {
                changes.insert(id.clone(), Change::Tombstone);
            }
        }

        Self { changes }
    }

    /// Merge the patch into `document`, producing a new validated document.
    ///
    /// Untouched records stay shared with `document`.
    pub fn apply_to(&self, document: &Document) -> Result<Document, EditorError> {
        let mut blocks = document.shared_blocks().clone();

        for (id, change) in &self.changes {
            match change {
                Change::Upsert(block) => {
                    blocks.insert(id.clone(), Arc::clone(block));
                }
                Change::Tombstone => {
                    if blocks.remove(id).is_none() {
                        return Err(EditorError::unknown(id));
                    }
                }
            }
        }

        Ok(Document::from_shared(blocks)?)
    }

    /// Decode `{ id: { type, data } | null }`; `null` deletes the id
    pub fn from_json_value(value: Value) -> Result<Self, ImportError> {
        let Value::Object(entries) = value else {
            return Err(ImportError::NotAnObject);
        };

        let mut patch = Patch::new();
        for (id, entry) in entries {
            if entry.is_null() {
                patch.set_tombstone(id);
            } else {
                let block = block_from_json(&id, entry)?;
                patch.set_upsert(id, block);
            }
        }
        Ok(patch)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ImportError> {
        Self::from_json_value(serde_json::from_str(source)?)
    }

    pub fn to_json_value(&self) -> Value {
        let entries: Map<String, Value> = self
            .changes
            .iter()
            .map(|(id, change)| {
                let value = match change {
                    Change::Upsert(block) => block_to_json(block),
                    Change::Tombstone => Value::Null,
                };
                (id.clone(), value)
            })
            .collect();
        Value::Object(entries)
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = (&'a BlockId, &'a Change);
    type IntoIter = btree_map::Iter<'a, BlockId, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

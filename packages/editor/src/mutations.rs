//! # Block Mutations
//!
//! High-level semantic operations on a document. Each mutation compiles
//! against the current snapshot into one [`Patch`], so it lands atomically
//! or not at all.
//!
//! ## Mutation Semantics
//!
//! ### MoveBlock
//! - The block ends up at `index` of the destination list as it reads after
//!   the move (clamped to its length)
//! - Same-list moves are pure reorders but still go through one patch
//! - Fails if the destination is the block itself or one of its descendants
//!
//! ### RemoveBlock
//! - Deletes the block and every descendant
//!
//! ### SetColumnCount
//! - Children of dropped columns move to the end of the last kept column

use maildraft_document::{Block, BlockId, BlockKind, ContainerRef, Document, Slots, Violation, ROOT_ID};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{EditorError, Patch};

/// Semantic mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Mutation {
    /// Add a new block to a container slot
    InsertBlock {
        container: ContainerRef,
        index: usize,
        id: BlockId,
        block: Block,
    },

    /// Relocate a block (and its subtree)
    MoveBlock {
        id: BlockId,
        container: ContainerRef,
        index: usize,
    },

    /// Remove a block and all descendants
    RemoveBlock { id: BlockId },

    /// Replace a block's opaque data
    UpdateData { id: BlockId, data: Map<String, Value> },

    /// Resize a columns container
    SetColumnCount { id: BlockId, count: usize },
}

impl Mutation {
    /// Id of the block the mutation is about
    pub fn block_id(&self) -> &str {
        match self {
            Mutation::InsertBlock { id, .. }
            | Mutation::MoveBlock { id, .. }
            | Mutation::RemoveBlock { id }
            | Mutation::UpdateData { id, .. }
            | Mutation::SetColumnCount { id, .. } => id,
        }
    }

    /// Compile into a patch against `doc`
    pub fn to_patch(&self, doc: &Document) -> Result<Patch, EditorError> {
        match self {
            Mutation::InsertBlock {
                container,
                index,
                id,
                block,
            } => Self::insert_patch(doc, container, *index, id, block),

            Mutation::MoveBlock {
                id,
                container,
                index,
            } => Self::move_patch(doc, id, container, *index),

            Mutation::RemoveBlock { id } => Self::remove_patch(doc, id),

            Mutation::UpdateData { id, data } => {
                let mut block = Self::block(doc, id)?.clone();
                block.data = data.clone();
                Ok(Patch::new().upsert(id.clone(), block))
            }

            Mutation::SetColumnCount { id, count } => Self::columns_patch(doc, id, *count),
        }
    }

    fn insert_patch(
        doc: &Document,
        container: &ContainerRef,
        index: usize,
        id: &str,
        block: &Block,
    ) -> Result<Patch, EditorError> {
        if doc.contains(id) {
            return Err(Violation::DuplicateId(id.to_string()).into());
        }

        let mut parent = Self::block(doc, &container.block_id)?.clone();
        let children = slot_mut(&mut parent, container)?;
        let at = index.min(children.len());
        children.insert(at, id.to_string());

        Ok(Patch::new()
            .upsert(container.block_id.clone(), parent)
            .upsert(id, block.clone()))
    }

    fn move_patch(
        doc: &Document,
        id: &str,
        container: &ContainerRef,
        index: usize,
    ) -> Result<Patch, EditorError> {
        if id == ROOT_ID {
            return Err(Violation::RootDetached.into());
        }
        Self::block(doc, id)?;
        Self::block(doc, &container.block_id)?;

        if doc.is_self_or_ancestor(id, &container.block_id) {
            return Err(Violation::Cycle(id.to_string()).into());
        }

        // Present for every non-root block of a valid document
        let source = doc
            .position_of(id)
            .ok_or_else(|| EditorError::unknown(id))?
            .clone();

        let mut patch = Patch::new();
        if source.container.block_id == container.block_id {
            let mut parent = Self::block(doc, &container.block_id)?.clone();
            slot_mut(&mut parent, &source.container)?.remove(source.index);
            let children = slot_mut(&mut parent, container)?;
            let at = index.min(children.len());
            children.insert(at, id.to_string());
            patch.set_upsert(container.block_id.clone(), parent);
        } else {
            let mut old_parent = Self::block(doc, &source.container.block_id)?.clone();
            slot_mut(&mut old_parent, &source.container)?.remove(source.index);

            let mut new_parent = Self::block(doc, &container.block_id)?.clone();
            let children = slot_mut(&mut new_parent, container)?;
            let at = index.min(children.len());
            children.insert(at, id.to_string());

            patch.set_upsert(source.container.block_id.clone(), old_parent);
            patch.set_upsert(container.block_id.clone(), new_parent);
        }

        Ok(patch)
    }

    fn remove_patch(doc: &Document, id: &str) -> Result<Patch, EditorError> {
        if id == ROOT_ID {
            return Err(Violation::RootDetached.into());
        }
        Self::block(doc, id)?;

        let source = doc
            .position_of(id)
            .ok_or_else(|| EditorError::unknown(id))?
            .clone();
        let mut parent = Self::block(doc, &source.container.block_id)?.clone();
        slot_mut(&mut parent, &source.container)?.remove(source.index);

        let mut patch = Patch::new().upsert(source.container.block_id.clone(), parent);
        for removed in doc.subtree(id) {
            patch.set_tombstone(removed);
        }
        Ok(patch)
    }

    fn columns_patch(doc: &Document, id: &str, count: usize) -> Result<Patch, EditorError> {
        let mut block = Self::block(doc, id)?.clone();
        let Slots::Columns(columns) = &mut block.slots else {
            return Err(shape_error(id, block.kind));
        };
        if count == 0 {
            return Err(shape_error(id, BlockKind::ColumnsContainer));
        }

        if count < columns.len() {
            let dropped: Vec<BlockId> = columns.drain(count..).flatten().collect();
            if let Some(last) = columns.last_mut() {
                last.extend(dropped);
            }
        } else {
            columns.resize_with(count, Vec::new);
        }

        Ok(Patch::new().upsert(id, block))
    }

    fn block<'a>(doc: &'a Document, id: &str) -> Result<&'a Block, EditorError> {
        doc.get(id).ok_or_else(|| EditorError::unknown(id))
    }
}

fn slot_mut<'a>(block: &'a mut Block, container: &ContainerRef) -> Result<&'a mut Vec<BlockId>, EditorError> {
    block.slots.slot_mut(container.slot).ok_or_else(|| {
        Violation::MissingSlot {
            id: container.block_id.clone(),
            slot: container.slot,
        }
        .into()
    })
}

fn shape_error(id: &str, kind: BlockKind) -> EditorError {
    Violation::SlotShape {
        id: id.to_string(),
        kind: kind.to_string(),
    }
    .into()
}

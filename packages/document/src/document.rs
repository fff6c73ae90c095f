//! # Document
//!
//! An email template as a flat, id-indexed map of blocks plus a derived
//! parent index. Nesting is expressed only through children lists, so
//! ancestry checks are iterative lookups instead of recursive walks.
//!
//! A `Document` is immutable once built: every constructor validates the
//! tree invariants and refuses to produce a value that breaks them. Block
//! records are shared (`Arc`) so deriving a new document from an old one
//! only copies the map, never the records it does not touch.
//!
//! ## Invariants
//!
//! 1. Every child id exists as a key
//! 2. Every non-root block appears in exactly one children list, once
//! 3. The parent relation is acyclic
//! 4. No children list contains duplicates
//! 5. The root exists and has no parent
//! 6. Each block's slot shape fits its kind

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Block, BlockId, BlockKind, ContainerRef, Violation};

/// Id of the distinguished root block
pub const ROOT_ID: &str = "root";

/// Where a block sits in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "containerId")]
    pub container: ContainerRef,
    pub index: usize,
}

/// Validated block tree
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    blocks: HashMap<BlockId, Arc<Block>>,
    parents: HashMap<BlockId, Position>,
}

impl Document {
    /// Document holding only a root block
    pub fn new(root: Block) -> Result<Self, Violation> {
        Self::from_blocks([(ROOT_ID.to_string(), root)])
    }

    /// Document with an empty `EmailLayout` root
    pub fn empty() -> Self {
        let root = Arc::new(Block::new(BlockKind::EmailLayout));
        Self {
            blocks: HashMap::from([(ROOT_ID.to_string(), root)]),
            parents: HashMap::new(),
        }
    }

    /// Build from owned records
    pub fn from_blocks<I>(blocks: I) -> Result<Self, Violation>
    where
        I: IntoIterator<Item = (BlockId, Block)>,
    {
        Self::from_shared(
            blocks
                .into_iter()
                .map(|(id, block)| (id, Arc::new(block)))
                .collect(),
        )
    }

    /// Build from shared records, validating every invariant
    pub fn from_shared(blocks: HashMap<BlockId, Arc<Block>>) -> Result<Self, Violation> {
        let parents = validate(&blocks).map_err(|violation| {
            tracing::debug!(blocks = blocks.len(), %violation, "Rejected document");
            violation
        })?;
        Ok(Self { blocks, parents })
    }

    pub fn root_id(&self) -> &str {
        ROOT_ID
    }

    pub fn root(&self) -> &Block {
        // Present by construction
        &self.blocks[ROOT_ID]
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id).map(Arc::as_ref)
    }

    pub fn get_shared(&self, id: &str) -> Option<&Arc<Block>> {
        self.blocks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &BlockId> + '_ {
        self.blocks.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockId, &Block)> + '_ {
        self.blocks.iter().map(|(id, block)| (id, block.as_ref()))
    }

    /// The shared record map, for deriving a changed document
    pub fn shared_blocks(&self) -> &HashMap<BlockId, Arc<Block>> {
        &self.blocks
    }

    /// Position of `id` among its parent's children (`None` for the root
    /// and for unknown ids)
    pub fn position_of(&self, id: &str) -> Option<&Position> {
        self.parents.get(id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(|p| p.container.block_id.as_str())
    }

    /// Children list behind a container reference
    pub fn children(&self, container: &ContainerRef) -> Option<&[BlockId]> {
        self.get(&container.block_id)?.children(container.slot)
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: &str) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            out.push(parent.to_string());
            current = parent;
        }
        out
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors
    pub fn is_self_or_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut current = id;
        loop {
            if current == ancestor {
                return true;
            }
            match self.parent_of(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// `id` followed by all of its descendants in depth-first pre-order
    pub fn subtree(&self, id: &str) -> Vec<BlockId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }

        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(block) = self.get(&current) {
                let children: Vec<&BlockId> = block.slots.child_ids().collect();
                stack.extend(children.into_iter().rev().cloned());
            }
            out.push(current);
        }
        out
    }

    /// All descendants of `id`, excluding `id`
    pub fn descendants(&self, id: &str) -> Vec<BlockId> {
        let mut subtree = self.subtree(id);
        if !subtree.is_empty() {
            subtree.remove(0);
        }
        subtree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// Check every invariant and derive the parent index
fn validate(blocks: &HashMap<BlockId, Arc<Block>>) -> Result<HashMap<BlockId, Position>, Violation> {
    if !blocks.contains_key(ROOT_ID) {
        return Err(Violation::MissingRoot);
    }

    let mut parents: HashMap<BlockId, Position> = HashMap::new();

    for (id, block) in blocks {
        if !block.kind.accepts_shape(&block.slots) {
            return Err(Violation::SlotShape {
                id: id.clone(),
                kind: block.kind.to_string(),
            });
        }

        for (slot, children) in block.slots.iter() {
            for (index, child) in children.iter().enumerate() {
                if child == ROOT_ID {
                    return Err(Violation::RootReferenced { parent: id.clone() });
                }
                if !blocks.contains_key(child) {
                    return Err(Violation::DanglingChild {
                        parent: id.clone(),
                        child: child.clone(),
                    });
                }

                if let Some(existing) = parents.get(child) {
                    if existing.container.block_id == *id {
                        return Err(Violation::DuplicateChild {
                            parent: id.clone(),
                            child: child.clone(),
                        });
                    }
                    return Err(Violation::MultipleParents {
                        child: child.clone(),
                        first: existing.container.block_id.clone(),
                        second: id.clone(),
                    });
                }

                parents.insert(
                    child.clone(),
                    Position {
                        container: ContainerRef::column(id.clone(), slot),
                        index,
                    },
                );
            }
        }
    }

    check_acyclic(blocks, &parents)?;

    for id in blocks.keys() {
        if id != ROOT_ID && !parents.contains_key(id) {
            return Err(Violation::Orphan(id.clone()));
        }
    }

    Ok(parents)
}

/// Every block has at most one parent here, so a cycle is found by walking
/// parent links until reaching an already-cleared block or revisiting one
/// on the current walk.
fn check_acyclic(
    blocks: &HashMap<BlockId, Arc<Block>>,
    parents: &HashMap<BlockId, Position>,
) -> Result<(), Violation> {
    let mut cleared: HashSet<&str> = HashSet::new();

    for start in blocks.keys() {
        let mut walk: Vec<&str> = Vec::new();
        let mut on_walk: HashSet<&str> = HashSet::new();
        let mut current = start.as_str();

        loop {
            if cleared.contains(current) {
                break;
            }
            if !on_walk.insert(current) {
                return Err(Violation::Cycle(current.to_string()));
            }
            walk.push(current);
            match parents.get(current) {
                Some(position) => current = position.container.block_id.as_str(),
                None => break,
            }
        }

        cleared.extend(walk);
    }

    Ok(())
}

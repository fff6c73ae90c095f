//! Bounded log of committed drops, oldest evicted first.

use std::collections::VecDeque;

use maildraft_document::{BlockId, BlockKind, Position};
use serde::{Deserialize, Serialize};

/// Default number of drops kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropOperation {
    /// An existing block changed place
    Move,
    /// A palette block entered the document
    Create,
}

/// One committed drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropRecord {
    pub block_id: BlockId,
    pub block_kind: BlockKind,

    /// Where the block was before the drop (`None` for palette drops)
    pub source: Option<Position>,

    /// Where the block is after the drop
    pub target: Position,

    pub operation: DropOperation,

    /// Store version the drop committed as
    pub version: u64,
}

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    records: VecDeque<DropRecord>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, record: DropRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Every kept record, most recent last
    pub fn all(&self) -> Vec<DropRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DropRecord> + '_ {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&DropRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

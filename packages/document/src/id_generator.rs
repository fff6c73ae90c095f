use crc32fast::Hasher;

use crate::{BlockId, Document};

/// Hash a session seed into a short, stable prefix using CRC32
pub fn seed_prefix(seed: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(seed.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for new blocks within one editor session
#[derive(Debug, Clone)]
pub struct BlockIdGenerator {
    prefix: String, // CRC32 of the seed
    count: u32,
}

impl BlockIdGenerator {
    pub fn new(seed: &str) -> Self {
        Self {
            prefix: seed_prefix(seed),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> BlockId {
        self.count += 1;
        format!("block-{}-{}", self.prefix, self.count)
    }

    /// Generate the next id not already used by `document`
    pub fn new_id_for(&mut self, document: &Document) -> BlockId {
        loop {
            let id = self.new_id();
            if !document.contains(&id) {
                return id;
            }
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

//! # Document Store
//!
//! Owns the current document snapshot and is the only place it changes.
//!
//! ## Lifecycle
//!
//! ```text
//! Patch → merge into copy → validate → commit → notify subscribers
//!                              ↓
//!                   refuse, nothing changes
//! ```
//!
//! Snapshots are handed out as `Arc<Document>`; a commit swaps in a new
//! `Arc`, so holders of older snapshots keep reading a consistent tree.

use std::fmt;
use std::sync::Arc;

use maildraft_document::{from_json_str, to_json_string, Block, Document};

use crate::{EditorError, Patch};

/// Change listener. Called synchronously with the new snapshot.
pub type Listener = Box<dyn FnMut(&Arc<Document>) + Send>;

/// Handle returned by [`DocumentStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

pub struct DocumentStore {
    current: Arc<Document>,

    /// Increments on each committed patch or import
    version: u64,

    listeners: Vec<(Subscription, Listener)>,
    next_subscription: u64,
}

impl DocumentStore {
    pub fn new(document: Document) -> Self {
        Self {
            current: Arc::new(document),
            version: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.current.get(id)
    }

    pub fn document(&self) -> &Document {
        &self.current
    }

    pub fn snapshot(&self) -> Arc<Document> {
        Arc::clone(&self.current)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Atomically apply `patch`.
    ///
    /// On failure the current snapshot, the version and the subscribers are
    /// all left untouched. An empty patch commits nothing.
    pub fn apply_patch(&mut self, patch: Patch) -> Result<Arc<Document>, EditorError> {
        if patch.is_empty() {
            return Ok(self.snapshot());
        }

        let next = patch.apply_to(&self.current).map_err(|err| {
            tracing::warn!(error = %err, changes = patch.len(), "Rejected patch");
            err
        })?;

        Ok(self.commit(next, patch.len()))
    }

    /// Replace the whole document from its JSON form
    pub fn import_json(&mut self, source: &str) -> Result<Arc<Document>, EditorError> {
        let document = from_json_str(source)?;
        tracing::debug!(blocks = document.len(), "Imported document");
        Ok(self.replace(document))
    }

    pub fn export_json(&self) -> String {
        to_json_string(&self.current)
    }

    /// Replace the whole document with an already validated one
    pub fn replace(&mut self, document: Document) -> Arc<Document> {
        let blocks = document.len();
        self.commit(document, blocks)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&Arc<Document>) + Send + 'static,
    {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((subscription, Box::new(listener)));
        subscription
    }

    /// Returns `false` if the subscription was already gone
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(s, _)| *s != subscription);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn commit(&mut self, next: Document, changes: usize) -> Arc<Document> {
        self.current = Arc::new(next);
        self.version += 1;
        tracing::debug!(version = self.version, changes, "Committed document");

        for (_, listener) in &mut self.listeners {
            listener(&self.current);
        }

        self.snapshot()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(Document::empty())
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("version", &self.version)
            .field("blocks", &self.current.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maildraft_document::{BlockKind, ROOT_ID};
    use std::sync::Mutex;

    fn add_text(id: &str) -> Patch {
        Patch::new()
            .upsert(ROOT_ID, Block::new(BlockKind::EmailLayout).with_children([id]))
            .upsert(id, Block::new(BlockKind::Text))
    }

    #[test]
    fn test_store_creation() {
        let store = DocumentStore::default();

        assert_eq!(store.version(), 0);
        assert_eq!(store.document().len(), 1);
        assert!(store.get(ROOT_ID).is_some());
    }

    #[test]
    fn test_apply_notifies_and_bumps_version() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = DocumentStore::default();
        let sink = Arc::clone(&seen);
        store.subscribe(move |doc| sink.lock().unwrap().push(doc.len()));

        let before = store.snapshot();
        let after = store.apply_patch(add_text("t")).unwrap();

        assert_eq!(store.version(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![2]);
        assert_eq!(before.len(), 1);
        assert!(Arc::ptr_eq(&after, &store.snapshot()));
    }

    #[test]
    fn test_empty_patch_is_silent() {
        let calls = Arc::new(Mutex::new(0));
        let mut store = DocumentStore::default();
        let counter = Arc::clone(&calls);
        store.subscribe(move |_| *counter.lock().unwrap() += 1);

        let before = store.snapshot();
        let after = store.apply_patch(Patch::new()).unwrap();

        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(store.version(), 0);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let calls = Arc::new(Mutex::new(0));
        let mut store = DocumentStore::default();
        let counter = Arc::clone(&calls);
        let subscription = store.subscribe(move |_| *counter.lock().unwrap() += 1);

        assert!(store.unsubscribe(subscription));
        assert!(!store.unsubscribe(subscription));
        store.apply_patch(add_text("t")).unwrap();

        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(store.listener_count(), 0);
    }
}

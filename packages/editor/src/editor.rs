//! # Editor
//!
//! One editing session: the document store plus everything that edits it.
//!
//! Every change to the document goes through this type, so each committed
//! edit is also recorded for undo, and each committed drop in the history
//! buffer.

use std::sync::Arc;

use maildraft_dnd::{DropSurface, DropTarget, Point, Rect, SurfaceRegistry};
use maildraft_document::{Block, BlockId, BlockIdGenerator, BlockKind, ContainerRef, Document};

use crate::store::Subscription;
use crate::{
    DocumentStore, DragController, DragPhase, DragStart, DropOutcome, EditorConfig, EditorError,
    HistoryBuffer, Mutation, Patch, UndoStack,
};

#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    store: DocumentStore,
    surfaces: SurfaceRegistry,
    drag: DragController,
    history: HistoryBuffer,
    undo_stack: UndoStack,
    ids: BlockIdGenerator,
}

impl Editor {
    /// Editor over an empty document
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        Self::with_document(Document::empty(), config)
    }

    pub fn with_document(document: Document, config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;
        Ok(Self::build(document, config))
    }

    fn build(document: Document, config: EditorConfig) -> Self {
        Self {
            store: DocumentStore::new(document),
            surfaces: SurfaceRegistry::new(),
            drag: DragController::new(),
            history: HistoryBuffer::new(config.history_capacity),
            undo_stack: UndoStack::with_max_levels(config.undo_levels),
            ids: BlockIdGenerator::new(&config.id_seed),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn snapshot(&self) -> Arc<Document> {
        self.store.snapshot()
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.store.get(id)
    }

    // --- Editing ---

    /// Apply a raw patch
    pub fn apply_patch(&mut self, patch: Patch) -> Result<Arc<Document>, EditorError> {
        let before = self.store.snapshot();
        let after = self.store.apply_patch(patch)?;
        self.undo_stack.record(&before, &after);
        Ok(after)
    }

    /// Apply a semantic mutation
    pub fn apply(&mut self, mutation: &Mutation) -> Result<Arc<Document>, EditorError> {
        let patch = mutation.to_patch(self.store.document())?;
        self.apply_patch(patch)
    }

    /// Empty block of `kind`, shaped by the editor config
    pub fn new_block(&self, kind: BlockKind) -> Block {
        let block = Block::new(kind);
        if kind == BlockKind::ColumnsContainer {
            block.with_columns(vec![Vec::<BlockId>::new(); self.config.default_columns])
        } else {
            block
        }
    }

    /// Insert an empty block of `kind` under a freshly generated id
    pub fn add_block(&mut self, container: ContainerRef, index: usize, kind: BlockKind) -> Result<BlockId, EditorError> {
        let id = self.ids.new_id_for(self.store.document());
        let mutation = Mutation::InsertBlock {
            container,
            index,
            id: id.clone(),
            block: self.new_block(kind),
        };
        self.apply(&mutation)?;
        Ok(id)
    }

    pub fn begin_batch(&mut self, description: Option<&str>) {
        self.undo_stack.begin_batch();
        if let Some(description) = description {
            self.undo_stack.set_batch_description(description);
        }
    }

    pub fn end_batch(&mut self) {
        self.undo_stack.end_batch();
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.undo_stack.undo(&mut self.store)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.undo_stack.redo(&mut self.store)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_stack.can_redo()
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    // --- Import/export ---

    /// Replace the document. Clears undo/redo and cancels an active drag.
    pub fn import_json(&mut self, source: &str) -> Result<Arc<Document>, EditorError> {
        let document = self.store.import_json(source)?;
        self.drag.cancel();
        self.undo_stack.clear();
        Ok(document)
    }

    pub fn export_json(&self) -> String {
        self.store.export_json()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&Arc<Document>) + Send + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.store.unsubscribe(subscription)
    }

    // --- Drop surfaces ---

    pub fn register_surface(&mut self, surface: DropSurface) {
        self.surfaces.register(surface);
    }

    pub fn unregister_surface(&mut self, container: &ContainerRef) -> Option<DropSurface> {
        self.surfaces.unregister(container)
    }

    pub fn clear_surfaces(&mut self) {
        self.surfaces.clear();
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    // --- Dragging ---

    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn drag_start(&mut self, event: &DragStart) -> Result<(), EditorError> {
        self.drag.start(event, self.store.document())
    }

    /// Start dragging a new block of `kind` from the palette; returns the id
    /// it will get on drop
    pub fn drag_start_palette(&mut self, kind: BlockKind) -> Result<BlockId, EditorError> {
        let id = self.ids.new_id_for(self.store.document());
        let block = self.new_block(kind);
        self.drag.start_palette(id.clone(), block, self.store.document())?;
        Ok(id)
    }

    pub fn drag_move(&mut self, pointer: Point, dragged_rect: Option<Rect>) -> Option<DropTarget> {
        self.drag.update(pointer, dragged_rect, &self.surfaces).cloned()
    }

    pub fn drag_end(&mut self) -> DropOutcome {
        let before = self.store.snapshot();
        let outcome = self.drag.end(&mut self.store);

        if let DropOutcome::Committed(record) = &outcome {
            self.history.record(record.clone());
            self.undo_stack.record(&before, &self.store.snapshot());
        }
        outcome
    }

    pub fn drag_cancel(&mut self) -> DropOutcome {
        self.drag.cancel()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::build(Document::empty(), EditorConfig::default())
    }
}

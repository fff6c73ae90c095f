//! # Maildraft Editor
//!
//! Core editing engine for block-tree email templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ input layer: pointer events, surface layout │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: one Editor per session              │
//! │  - drag session state machine               │
//! │  - target resolution (maildraft-dnd)        │
//! │  - mutations compiled into patches          │
//! │  - undo/redo and drop history               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: validated Arc<Document> snapshots    │
//! │  → subscribers                              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Patches are atomic**: a change lands whole or not at all
//! 2. **Documents are always valid**: invariants are checked before commit
//! 3. **Snapshots are immutable**: readers keep old versions for free
//! 4. **Drag state is ephemeral**: only a committed drop touches the document
//!
//! ## Usage
//!
//! ```rust
//! use maildraft_editor::{Editor, DragStart, DropOutcome};
//! use maildraft_dnd::{DropSurface, Point, Rect};
//! use maildraft_document::{BlockKind, ContainerRef};
//!
//! let mut editor = Editor::default();
//! editor.import_json(r#"{
//!     "root": { "type": "EmailLayout", "data": { "childrenIds": ["a", "b"] } },
//!     "a": { "type": "Text", "data": {} },
//!     "b": { "type": "Text", "data": {} }
//! }"#).unwrap();
//!
//! editor.register_surface(
//!     DropSurface::new(ContainerRef::new("root"), [BlockKind::Text], Rect::new(0.0, 0.0, 600.0, 200.0))
//!         .with_children(vec![Rect::new(0.0, 0.0, 600.0, 100.0), Rect::new(0.0, 100.0, 600.0, 100.0)]),
//! );
//!
//! editor.drag_start(&DragStart::new("a", BlockKind::Text)).unwrap();
//! editor.drag_move(Point::new(10.0, 190.0), None);
//! assert!(matches!(editor.drag_end(), DropOutcome::Committed(_)));
//!
//! assert_eq!(editor.document().children(&ContainerRef::new("root")).unwrap(), ["b", "a"]);
//! ```

mod config;
mod editor;
mod errors;
mod history;
mod mutations;
mod patch;
mod session;
mod store;
mod undo_stack;

pub use config::EditorConfig;
pub use editor::Editor;
pub use errors::EditorError;
pub use history::{DropOperation, DropRecord, HistoryBuffer, DEFAULT_HISTORY_CAPACITY};
pub use mutations::Mutation;
pub use patch::{Change, Patch};
pub use session::{effective_index, DragController, DragOrigin, DragPhase, DragStart, DropOutcome};
pub use store::{DocumentStore, Listener, Subscription};
pub use undo_stack::{UndoEntry, UndoStack, DEFAULT_UNDO_LEVELS};

//! # Maildraft Document
//!
//! Block tree model for email templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ json: exchanged { id: { type, data } } form │
//! └─────────────────────────────────────────────┘
//!                     ↕
//! ┌─────────────────────────────────────────────┐
//! │ document: flat id → Block map               │
//! │  - children lists per container slot        │
//! │  - derived parent index                     │
//! │  - invariants checked on every construction │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use maildraft_document::{from_json_str, to_json_value, ContainerRef};
//!
//! let doc = from_json_str(r#"{
//!     "root": { "type": "EmailLayout", "data": { "childrenIds": ["hello"] } },
//!     "hello": { "type": "Text", "data": { "props": { "text": "Hello" } } }
//! }"#).unwrap();
//!
//! assert_eq!(doc.children(&ContainerRef::new("root")).unwrap(), ["hello"]);
//! assert_eq!(doc.parent_of("hello"), Some("root"));
//! let _json = to_json_value(&doc);
//! ```

mod block;
mod document;
mod error;
mod id_generator;
pub mod json;

pub use block::{Block, BlockId, BlockKind, ChildrenPlacement, ContainerRef, Slots, DEFAULT_COLUMNS};
pub use document::{Document, Position, ROOT_ID};
pub use error::{ImportError, Violation};
pub use id_generator::{seed_prefix, BlockIdGenerator};
pub use json::{from_json_str, from_json_value, to_json_string, to_json_value};

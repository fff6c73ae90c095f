//! # Maildraft DnD
//!
//! Geometry and drop-target resolution for dragging blocks around the
//! editor canvas. Nothing here touches the document: the input layer
//! registers [`DropSurface`]s, and [`resolve`] maps a pointer sample to a
//! [`DropTarget`].
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::HashSet;
//! use maildraft_dnd::{resolve_target, DragSubject, DropSurface, Point, Rect, SurfaceRegistry};
//! use maildraft_document::{BlockKind, ContainerRef};
//!
//! let mut surfaces = SurfaceRegistry::new();
//! surfaces.register(
//!     DropSurface::new(ContainerRef::new("root"), [BlockKind::Text], Rect::new(0.0, 0.0, 600.0, 400.0))
//!         .with_children(vec![Rect::new(0.0, 0.0, 600.0, 100.0)]),
//! );
//!
//! let excluded = HashSet::new();
//! let subject = DragSubject { kind: BlockKind::Text, rect: None, excluded: &excluded, depths: None };
//! let target = resolve_target(Point::new(10.0, 300.0), &subject, &surfaces).unwrap();
//! assert_eq!(target.index, 1);
//! ```

mod collision;
mod geometry;
mod resolver;
mod surface;

pub use geometry::{Axis, Point, Rect};
pub use resolver::{resolve, resolve_target, DragSubject, DropTarget, Pass, Resolution};
pub use surface::{DropSurface, SurfaceRegistry};

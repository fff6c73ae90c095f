//! # Target Resolver
//!
//! Decides, for one pointer sample, which container slot and insertion
//! index a dragged block would land in. Stateless: every call sees only the
//! pointer, the dragged subject and the registered surfaces.
//!
//! ## Policy
//!
//! Surfaces that do not accept the dragged kind, or that belong to the
//! dragged block or one of its descendants, are removed first. The rest are
//! tried in order:
//!
//! 1. innermost surface containing the pointer
//! 2. surface overlapping the dragged box the most
//! 3. surface whose center is nearest to the pointer
//!
//! The index inside the chosen surface comes from child midpoints.

use std::collections::{HashMap, HashSet};

use maildraft_document::{BlockId, BlockKind, ContainerRef};
use serde::{Deserialize, Serialize};

use crate::collision::{closest_center, insertion_index, pointer_within, rect_intersection};
use crate::geometry::{Point, Rect};
use crate::surface::DropSurface;

/// Container slot plus insertion index in that slot's current ordering
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    #[serde(rename = "containerId")]
    pub container: ContainerRef,
    pub index: usize,
}

impl DropTarget {
    pub fn new(container: ContainerRef, index: usize) -> Self {
        Self { container, index }
    }
}

/// Which collision pass produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pass {
    Pointer,
    Overlap,
    NearestCenter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: DropTarget,
    pub pass: Pass,
}

/// What is being dragged
#[derive(Debug, Clone, Copy)]
pub struct DragSubject<'a> {
    pub kind: BlockKind,

    /// Bounding box of the dragged element, when the input layer has one
    pub rect: Option<Rect>,

    /// The dragged block and its descendants; their surfaces are never
    /// valid targets
    pub excluded: &'a HashSet<BlockId>,

    /// Tree depth of container blocks (root = 0), used to pick the innermost
    /// of several surfaces under the pointer
    pub depths: Option<&'a HashMap<BlockId, usize>>,
}

/// Resolve a pointer sample against `surfaces`
pub fn resolve<'s, I>(pointer: Point, subject: &DragSubject<'_>, surfaces: I) -> Option<Resolution>
where
    I: IntoIterator<Item = &'s DropSurface>,
{
    let candidates: Vec<&DropSurface> = surfaces
        .into_iter()
        .filter(|s| s.accepts(subject.kind))
        .filter(|s| !subject.excluded.contains(&s.container.block_id))
        .collect();

    if candidates.is_empty() {
        tracing::trace!(kind = %subject.kind, "No surface accepts dragged block");
        return None;
    }

    let (surface, pass) = if let Some(surface) = pointer_within(&candidates, pointer, subject.depths) {
        (surface, Pass::Pointer)
    } else if let Some(surface) = subject
        .rect
        .as_ref()
        .and_then(|rect| rect_intersection(&candidates, rect))
    {
        (surface, Pass::Overlap)
    } else {
        (closest_center(&candidates, pointer)?, Pass::NearestCenter)
    };

    let target = DropTarget::new(surface.container.clone(), insertion_index(surface, pointer));
    tracing::trace!(
        container = %target.container,
        index = target.index,
        ?pass,
        "Resolved drop target"
    );

    Some(Resolution { target, pass })
}

/// [`resolve`] without the diagnostics
pub fn resolve_target<'s, I>(pointer: Point, subject: &DragSubject<'_>, surfaces: I) -> Option<DropTarget>
where
    I: IntoIterator<Item = &'s DropSurface>,
{
    resolve(pointer, subject, surfaces).map(|r| r.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceRegistry;

    fn registry() -> SurfaceRegistry {
        let mut registry = SurfaceRegistry::new();
        registry.register(
            DropSurface::new(
                ContainerRef::new("root"),
                BlockKind::EmailLayout.default_accepts(),
                Rect::new(0.0, 0.0, 600.0, 1000.0),
            )
            .with_children(vec![Rect::new(0.0, 0.0, 600.0, 100.0), Rect::new(0.0, 100.0, 600.0, 300.0)]),
        );
        registry.register(
            DropSurface::new(
                ContainerRef::column("cols", 0),
                BlockKind::ColumnsContainer.default_accepts(),
                Rect::new(0.0, 100.0, 300.0, 300.0),
            )
            .with_children(vec![Rect::new(0.0, 100.0, 300.0, 100.0)]),
        );
        registry
    }

    #[test]
    fn test_nested_column_wins_over_layout() {
        let excluded = HashSet::new();
        let subject = DragSubject {
            kind: BlockKind::Text,
            rect: None,
            excluded: &excluded,
            depths: None,
        };

        let resolution = resolve(Point::new(50.0, 180.0), &subject, &registry()).unwrap();
        assert_eq!(resolution.pass, Pass::Pointer);
        assert_eq!(resolution.target, DropTarget::new(ContainerRef::column("cols", 0), 1));
    }

    #[test]
    fn test_capability_filter_falls_back_to_outer() {
        let excluded = HashSet::new();
        let subject = DragSubject {
            kind: BlockKind::ColumnsContainer,
            rect: None,
            excluded: &excluded,
            depths: None,
        };

        let target = resolve_target(Point::new(50.0, 180.0), &subject, &registry()).unwrap();
        assert_eq!(target, DropTarget::new(ContainerRef::new("root"), 1));
    }

    #[test]
    fn test_excluded_surfaces_are_skipped() {
        let excluded: HashSet<BlockId> = ["cols".to_string()].into();
        let subject = DragSubject {
            kind: BlockKind::Text,
            rect: None,
            excluded: &excluded,
            depths: None,
        };

        let target = resolve_target(Point::new(50.0, 180.0), &subject, &registry()).unwrap();
        assert_eq!(target.container, ContainerRef::new("root"));
    }

    #[test]
    fn test_no_candidates() {
        let excluded = HashSet::new();
        let subject = DragSubject {
            kind: BlockKind::EmailLayout,
            rect: None,
            excluded: &excluded,
            depths: None,
        };

        assert!(resolve(Point::new(50.0, 50.0), &subject, &registry()).is_none());
    }

    #[test]
    fn test_target_wire_format() {
        let target = DropTarget::new(ContainerRef::column("cols", 2), 1);
        let json = serde_json::to_value(&target).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "containerId": { "blockId": "cols", "slot": 2 }, "index": 1 })
        );
    }
}

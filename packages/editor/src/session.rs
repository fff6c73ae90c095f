//! # Drag Session
//!
//! State machine for one pointer gesture:
//!
//! ```text
//!          start                 end (target differs)
//!  Idle ──────────▶ Dragging ─────────────────────────▶ Idle + one patch
//!                    │  ▲ │
//!              move  └──┘ │ end (no target / same spot) or cancel
//!                         └──────────────────────────▶ Idle, document untouched
//! ```
//!
//! The controller keeps only ephemeral state. The document is read when a
//! drag starts and when it ends, and is written at most once per gesture.

use std::collections::{HashMap, HashSet};

use maildraft_dnd::{resolve, DragSubject, DropTarget, Point, Rect, SurfaceRegistry};
use maildraft_document::{Block, BlockId, BlockKind, ContainerRef, Document, Position, Violation, ROOT_ID};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::history::{DropOperation, DropRecord};
use crate::{DocumentStore, EditorError, Mutation};

/// Drag-start event as reported by the input layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragStart {
    pub dragged_id: BlockId,
    pub dragged_kind: BlockKind,
    #[serde(default)]
    pub source_container_id: Option<ContainerRef>,
    #[serde(default)]
    pub source_index: Option<usize>,
}

impl DragStart {
    pub fn new(dragged_id: impl Into<BlockId>, dragged_kind: BlockKind) -> Self {
        Self {
            dragged_id: dragged_id.into(),
            dragged_kind,
            source_container_id: None,
            source_index: None,
        }
    }

    pub fn at_position(mut self, container: ContainerRef, index: usize) -> Self {
        self.source_container_id = Some(container);
        self.source_index = Some(index);
        self
    }
}

/// Where the dragged block comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DragOrigin {
    /// A block already in the document
    Existing { source: Position },

    /// A fresh block from the palette, not yet in the document
    Palette { block: Block },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    Idle,
    Dragging,
}

/// How a gesture ended
#[derive(Debug)]
pub enum DropOutcome {
    /// The drop changed the document
    Committed(DropRecord),

    /// The target was the dragged block's own position
    Unchanged,

    /// Released outside every valid target
    NoTarget,

    /// The drop was refused; the document is untouched
    Rejected(EditorError),

    Cancelled,

    /// There was no gesture to end
    NoActiveDrag,
}

impl DropOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, DropOutcome::Committed(_))
    }

    pub fn record(&self) -> Option<&DropRecord> {
        match self {
            DropOutcome::Committed(record) => Some(record),
            _ => None,
        }
    }

    /// Collapse into a `Result` for callers that treat a drop outside every
    /// target as an error
    pub fn into_result(self) -> Result<Option<DropRecord>, EditorError> {
        match self {
            DropOutcome::Committed(record) => Ok(Some(record)),
            DropOutcome::NoTarget => Err(EditorError::InvalidDropTarget),
            DropOutcome::Rejected(err) => Err(err),
            DropOutcome::Unchanged | DropOutcome::Cancelled | DropOutcome::NoActiveDrag => Ok(None),
        }
    }

    fn status(&self) -> &'static str {
        match self {
            DropOutcome::Committed(_) => "committed",
            DropOutcome::Unchanged => "unchanged",
            DropOutcome::NoTarget => "noTarget",
            DropOutcome::Rejected(_) => "rejected",
            DropOutcome::Cancelled => "cancelled",
            DropOutcome::NoActiveDrag => "noActiveDrag",
        }
    }
}

impl Serialize for DropOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DropOutcome", 2)?;
        state.serialize_field("status", self.status())?;
        match self {
            DropOutcome::Committed(record) => state.serialize_field("record", record)?,
            DropOutcome::Rejected(err) => state.serialize_field("error", &err.to_string())?,
            _ => state.skip_field("record")?,
        }
        state.end()
    }
}

#[derive(Debug)]
struct ActiveDrag {
    dragged_id: BlockId,
    kind: BlockKind,
    origin: DragOrigin,

    /// Dragged block plus descendants; never valid targets
    excluded: HashSet<BlockId>,

    /// Tree depth of every container block when the drag started
    depths: HashMap<BlockId, usize>,

    current_target: Option<DropTarget>,
}

/// Drag session controller. At most one gesture is active at a time.
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        if self.active.is_some() {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.dragged_id.as_str())
    }

    pub fn origin(&self) -> Option<&DragOrigin> {
        self.active.as_ref().map(|a| &a.origin)
    }

    pub fn current_target(&self) -> Option<&DropTarget> {
        self.active.as_ref().and_then(|a| a.current_target.as_ref())
    }

    /// Begin dragging a block that is already in `document`.
    ///
    /// The source position is read from the document; a start event that
    /// claims otherwise is logged and overridden. An active gesture is
    /// cancelled first.
    pub fn start(&mut self, event: &DragStart, document: &Document) -> Result<(), EditorError> {
        self.cancel_previous();

        let id = event.dragged_id.as_str();
        if id == ROOT_ID {
            return Err(Violation::RootDetached.into());
        }
        let block = document.get(id).ok_or_else(|| EditorError::unknown(id))?;
        let source = document
            .position_of(id)
            .ok_or_else(|| EditorError::unknown(id))?
            .clone();

        let claimed_container = event.source_container_id.as_ref();
        if claimed_container.map_or(false, |c| *c != source.container)
            || event.source_index.map_or(false, |i| i != source.index)
        {
            tracing::warn!(
                block = id,
                claimed_container = ?claimed_container,
                claimed_index = ?event.source_index,
                actual = %source.container,
                actual_index = source.index,
                "Drag start disagrees with document, using document position"
            );
        }
        if block.kind != event.dragged_kind {
            tracing::warn!(block = id, claimed = %event.dragged_kind, actual = %block.kind, "Drag start kind mismatch");
        }

        tracing::debug!(block = id, source = %source.container, index = source.index, "Drag started");
        self.active = Some(ActiveDrag {
            dragged_id: id.to_string(),
            kind: block.kind,
            origin: DragOrigin::Existing { source },
            excluded: document.subtree(id).into_iter().collect(),
            depths: container_depths(document),
            current_target: None,
        });
        Ok(())
    }

    /// Begin dragging a fresh block that will be created under `id` on drop
    pub fn start_palette(&mut self, id: BlockId, block: Block, document: &Document) -> Result<(), EditorError> {
        self.cancel_previous();

        if document.contains(&id) {
            return Err(Violation::DuplicateId(id).into());
        }

        tracing::debug!(block = %id, kind = %block.kind, "Palette drag started");
        self.active = Some(ActiveDrag {
            excluded: HashSet::from([id.clone()]),
            dragged_id: id,
            kind: block.kind,
            origin: DragOrigin::Palette { block },
            depths: container_depths(document),
            current_target: None,
        });
        Ok(())
    }

    /// Re-resolve the target for a new pointer sample. Ignored while idle.
    pub fn update(
        &mut self,
        pointer: Point,
        dragged_rect: Option<Rect>,
        surfaces: &SurfaceRegistry,
    ) -> Option<&DropTarget> {
        let Some(active) = self.active.as_mut() else {
            tracing::trace!("Pointer move without an active drag");
            return None;
        };

        let subject = DragSubject {
            kind: active.kind,
            rect: dragged_rect,
            excluded: &active.excluded,
            depths: Some(&active.depths),
        };
        active.current_target = resolve(pointer, &subject, surfaces).map(|r| r.target);
        active.current_target.as_ref()
    }

    /// Abandon the gesture; the document is never touched
    pub fn cancel(&mut self) -> DropOutcome {
        match self.active.take() {
            Some(active) => {
                tracing::debug!(block = %active.dragged_id, "Drag cancelled");
                DropOutcome::Cancelled
            }
            None => DropOutcome::NoActiveDrag,
        }
    }

    /// Finish the gesture, committing at most one patch to `store`
    pub fn end(&mut self, store: &mut DocumentStore) -> DropOutcome {
        let Some(active) = self.active.take() else {
            tracing::trace!("Drag end without an active drag");
            return DropOutcome::NoActiveDrag;
        };

        let Some(target) = active.current_target else {
            tracing::debug!(block = %active.dragged_id, "Dropped outside every target");
            return DropOutcome::NoTarget;
        };

        let (mutation, source, operation) = match active.origin {
            DragOrigin::Existing { .. } => {
                // The document may have changed since the drag started
                let Some(source) = store.document().position_of(&active.dragged_id).cloned() else {
                    return DropOutcome::Rejected(EditorError::unknown(&active.dragged_id));
                };

                let Some(index) = effective_index(&source, &target) else {
                    tracing::debug!(block = %active.dragged_id, "Dropped onto own position");
                    return DropOutcome::Unchanged;
                };

                let mutation = Mutation::MoveBlock {
                    id: active.dragged_id.clone(),
                    container: target.container.clone(),
                    index,
                };
                (mutation, Some(source), DropOperation::Move)
            }
            DragOrigin::Palette { block } => {
                let mutation = Mutation::InsertBlock {
                    container: target.container.clone(),
                    index: target.index,
                    id: active.dragged_id.clone(),
                    block,
                };
                (mutation, None, DropOperation::Create)
            }
        };

        let committed = mutation
            .to_patch(store.document())
            .and_then(|patch| store.apply_patch(patch));
        let document = match committed {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(block = %active.dragged_id, error = %err, "Drop rejected");
                return DropOutcome::Rejected(err);
            }
        };

        let Some(final_position) = document.position_of(&active.dragged_id).cloned() else {
            return DropOutcome::Rejected(EditorError::unknown(&active.dragged_id));
        };

        tracing::debug!(
            block = %active.dragged_id,
            target = %final_position.container,
            index = final_position.index,
            version = store.version(),
            "Drop committed"
        );

        DropOutcome::Committed(DropRecord {
            block_id: active.dragged_id,
            block_kind: active.kind,
            source,
            target: final_position,
            operation,
            version: store.version(),
        })
    }

    fn cancel_previous(&mut self) {
        if let Some(previous) = self.active.take() {
            tracing::debug!(block = %previous.dragged_id, "New drag cancels active drag");
        }
    }
}

fn container_depths(document: &Document) -> HashMap<BlockId, usize> {
    document
        .iter()
        .filter(|(_, block)| !block.is_leaf())
        .map(|(id, _)| (id.clone(), document.ancestors(id).len()))
        .collect()
}

/// Final index for dropping a block at `source` onto `target`.
///
/// Target indices are insertion slots in the list as it reads before the
/// move, so a forward move within one list lands one slot earlier. `None`
/// when the block would end up where it already is.
pub fn effective_index(source: &Position, target: &DropTarget) -> Option<usize> {
    if source.container != target.container {
        return Some(target.index);
    }

    let index = if source.index < target.index {
        target.index - 1
    } else {
        target.index
    };

    (index != source.index).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(container: &str, index: usize) -> Position {
        Position {
            container: ContainerRef::new(container),
            index,
        }
    }

    fn to(container: &str, index: usize) -> DropTarget {
        DropTarget::new(ContainerRef::new(container), index)
    }

    #[test]
    fn test_effective_index_shift() {
        assert_eq!(effective_index(&at("root", 0), &to("root", 3)), Some(2));
        assert_eq!(effective_index(&at("root", 2), &to("root", 0)), Some(0));
        assert_eq!(effective_index(&at("root", 1), &to("root", 1)), None);
        assert_eq!(effective_index(&at("root", 1), &to("root", 2)), None);
        assert_eq!(effective_index(&at("root", 1), &to("box", 1)), Some(1));
    }

    #[test]
    fn test_idle_controller_ignores_input() {
        let mut controller = DragController::new();
        let mut store = DocumentStore::default();

        assert_eq!(controller.phase(), DragPhase::Idle);
        assert!(controller
            .update(Point::new(0.0, 0.0), None, &SurfaceRegistry::new())
            .is_none());
        assert!(matches!(controller.end(&mut store), DropOutcome::NoActiveDrag));
        assert!(matches!(controller.cancel(), DropOutcome::NoActiveDrag));
    }

    #[test]
    fn test_start_rejects_root_and_unknown() {
        let mut controller = DragController::new();
        let document = Document::empty();

        let err = controller
            .start(&DragStart::new(ROOT_ID, BlockKind::EmailLayout), &document)
            .unwrap_err();
        assert!(matches!(err, EditorError::InvariantViolation(Violation::RootDetached)));

        let err = controller
            .start(&DragStart::new("ghost", BlockKind::Text), &document)
            .unwrap_err();
        assert!(matches!(err, EditorError::UnknownBlockId(_)));
        assert_eq!(controller.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_outcome_wire_format() {
        let json = serde_json::to_value(DropOutcome::NoTarget).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "noTarget" }));

        let json = serde_json::to_value(DropOutcome::Rejected(EditorError::InvalidDropTarget)).unwrap();
        assert_eq!(json["status"], "rejected");
        assert!(json["error"].is_string());
    }

    #[test]
    fn test_drag_start_event_format() {
        let event: DragStart = serde_json::from_str(
            r#"{ "draggedId": "a", "draggedKind": "Text", "sourceContainerId": { "blockId": "root" }, "sourceIndex": 2 }"#,
        )
        .unwrap();

        assert_eq!(
            event,
            DragStart::new("a", BlockKind::Text).at_position(ContainerRef::new("root"), 2)
        );
    }
}

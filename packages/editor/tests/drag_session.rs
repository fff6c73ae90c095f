//! Drag gestures end to end: start → move → end/cancel through the editor

mod common;

use std::sync::Arc;

use common::{children, editor, editor_with, register_layout, root_children};
use maildraft_dnd::{DropSurface, DropTarget, Point, Rect};
use maildraft_document::{BlockKind, ContainerRef, Position, Violation};
use maildraft_editor::{DragPhase, DragStart, DropOperation, DropOutcome, EditorConfig, EditorError, Mutation};

fn drag(editor: &mut maildraft_editor::Editor, id: &str, kind: BlockKind, to: Point) -> DropOutcome {
    editor.drag_start(&DragStart::new(id, kind)).unwrap();
    editor.drag_move(to, None);
    editor.drag_end()
}

fn drag_target(editor: &mut maildraft_editor::Editor, id: &str, to: Point) -> DropTarget {
    let kind = editor.get(id).unwrap().kind;
    editor.drag_start(&DragStart::new(id, kind)).unwrap();
    editor.drag_move(to, None).unwrap()
}

#[test]
fn test_reorder_within_one_list() {
    let mut editor = editor();
    register_layout(&mut editor);

    let outcome = drag(&mut editor, "a", BlockKind::Text, Point::new(300.0, 250.0));
    let record = outcome.record().unwrap();
    assert_eq!(root_children(&editor), ["b", "c", "a", "d", "cols"]);
    assert_eq!(record.operation, DropOperation::Move);
    assert_eq!(
        record.source,
        Some(Position {
            container: ContainerRef::new("root"),
            index: 0
        })
    );
    assert_eq!(record.target.index, 2);

    drag(&mut editor, "a", BlockKind::Text, Point::new(300.0, 10.0));
    assert_eq!(root_children(&editor), ["a", "b", "c", "d", "cols"]);
}

#[test]
fn test_move_into_another_container() {
    let mut editor = editor();
    register_layout(&mut editor);

    let outcome = drag(&mut editor, "c", BlockKind::Text, Point::new(500.0, 450.0));

    assert!(outcome.is_committed());
    assert_eq!(root_children(&editor), ["a", "b", "d", "cols"]);
    assert_eq!(children(&editor, ContainerRef::column("cols", 2)), ["c"]);

    let parents: usize = editor
        .document()
        .iter()
        .map(|(_, block)| block.slots.child_ids().filter(|id| *id == "c").count())
        .sum();
    assert_eq!(parents, 1);
}

#[test]
fn test_innermost_surface_receives_drop() {
    let mut editor = editor();
    register_layout(&mut editor);

    drag(&mut editor, "a", BlockKind::Text, Point::new(300.0, 470.0));

    assert_eq!(children(&editor, ContainerRef::new("box")), ["inner", "a"]);
}

#[test]
fn test_container_filling_its_column_beats_the_column() {
    let mut editor = editor();
    register_layout(&mut editor);

    // `box` now covers column 1 exactly
    editor.register_surface(
        DropSurface::new(
            ContainerRef::new("box"),
            BlockKind::Container.default_accepts(),
            Rect::new(200.0, 400.0, 200.0, 100.0),
        )
        .with_children(vec![Rect::new(200.0, 400.0, 200.0, 40.0)]),
    );

    let target = drag_target(&mut editor, "a", Point::new(300.0, 470.0));
    assert_eq!(target.container, ContainerRef::new("box"));
    assert_eq!(target.index, 1);

    editor.drag_end();
    assert_eq!(children(&editor, ContainerRef::new("box")), ["inner", "a"]);
    assert_eq!(children(&editor, ContainerRef::column("cols", 1)), ["box"]);
}

#[test]
fn test_drop_between_existing_children() {
    let mut editor = editor();
    register_layout(&mut editor);

    let outcome = drag(&mut editor, "x", BlockKind::Image, Point::new(300.0, 120.0));

    assert_eq!(outcome.record().unwrap().target.index, 1);
    assert_eq!(root_children(&editor), ["a", "x", "b", "c", "d", "cols"]);
    assert!(children(&editor, ContainerRef::column("cols", 0)).is_empty());
}

#[test]
fn test_dragged_subtree_is_never_a_target() {
    let mut editor = editor();
    register_layout(&mut editor);
    let before = editor.snapshot();

    // Pointer over `box`, which lives inside the dragged columns block
    let outcome = drag(&mut editor, "cols", BlockKind::ColumnsContainer, Point::new(300.0, 420.0));

    assert!(matches!(outcome, DropOutcome::Unchanged));
    assert!(Arc::ptr_eq(&before, &editor.snapshot()));
}

#[test]
fn test_direct_move_into_descendant_is_rejected() {
    let mut editor = editor();
    let version = editor.version();

    let err = editor
        .apply(&Mutation::MoveBlock {
            id: "cols".into(),
            container: ContainerRef::new("box"),
            index: 0,
        })
        .unwrap_err();

    assert!(matches!(err, EditorError::InvariantViolation(Violation::Cycle(_))));
    assert_eq!(editor.version(), version);
}

#[test]
fn test_drop_onto_own_slot_keeps_snapshot() {
    let mut editor = editor();
    register_layout(&mut editor);
    let before = editor.snapshot();
    let version = editor.version();

    for y in [10.0, 60.0, 140.0] {
        let outcome = drag(&mut editor, "a", BlockKind::Text, Point::new(300.0, y));
        assert!(matches!(outcome, DropOutcome::Unchanged), "y = {y}");
    }

    assert!(Arc::ptr_eq(&before, &editor.snapshot()));
    assert_eq!(editor.version(), version);
    assert!(editor.history().is_empty());
    assert!(!editor.can_undo());
}

#[test]
fn test_release_without_target() {
    let mut editor = editor();
    let before = editor.snapshot();

    editor.drag_start(&DragStart::new("a", BlockKind::Text)).unwrap();
    assert!(editor.drag_move(Point::new(10.0, 10.0), None).is_none());
    let outcome = editor.drag_end();

    assert!(matches!(outcome, DropOutcome::NoTarget));
    assert!(matches!(outcome.into_result(), Err(EditorError::InvalidDropTarget)));
    assert!(Arc::ptr_eq(&before, &editor.snapshot()));
}

#[test]
fn test_cancel_leaves_document_untouched() {
    let mut editor = editor();
    register_layout(&mut editor);
    let before = editor.snapshot();

    editor.drag_start(&DragStart::new("a", BlockKind::Text)).unwrap();
    assert!(editor.drag_move(Point::new(500.0, 450.0), None).is_some());
    assert_eq!(editor.drag_phase(), DragPhase::Dragging);

    assert!(matches!(editor.drag_cancel(), DropOutcome::Cancelled));
    assert_eq!(editor.drag_phase(), DragPhase::Idle);
    assert!(matches!(editor.drag_end(), DropOutcome::NoActiveDrag));
    assert!(Arc::ptr_eq(&before, &editor.snapshot()));
}

#[test]
fn test_new_drag_replaces_active_one() {
    let mut editor = editor();
    register_layout(&mut editor);

    editor.drag_start(&DragStart::new("a", BlockKind::Text)).unwrap();
    editor.drag_move(Point::new(500.0, 450.0), None);
    editor.drag_start(&DragStart::new("d", BlockKind::Text)).unwrap();

    assert_eq!(editor.drag().dragged_id(), Some("d"));
    assert!(editor.drag().current_target().is_none());

    editor.drag_move(Point::new(300.0, 10.0), None);
    editor.drag_end();
    assert_eq!(root_children(&editor), ["d", "a", "b", "c", "cols"]);
}

#[test]
fn test_start_event_position_is_advisory() {
    let mut editor = editor();
    register_layout(&mut editor);

    // Claims `b` sits at index 3; the document says 1
    let event = DragStart::new("b", BlockKind::Text).at_position(ContainerRef::new("root"), 3);
    editor.drag_start(&event).unwrap();
    editor.drag_move(Point::new(300.0, 10.0), None);
    let outcome = editor.drag_end();

    assert_eq!(outcome.record().unwrap().source.as_ref().unwrap().index, 1);
    assert_eq!(root_children(&editor), ["b", "a", "c", "d", "cols"]);
}

#[test]
fn test_unknown_block_cannot_be_dragged() {
    let mut editor = editor();

    let err = editor.drag_start(&DragStart::new("ghost", BlockKind::Text)).unwrap_err();

    assert!(matches!(err, EditorError::UnknownBlockId(_)));
    assert_eq!(editor.drag_phase(), DragPhase::Idle);
}

#[test]
fn test_block_removed_mid_drag_is_rejected() {
    let mut editor = editor();
    register_layout(&mut editor);

    editor.drag_start(&DragStart::new("a", BlockKind::Text)).unwrap();
    editor.drag_move(Point::new(500.0, 450.0), None);
    editor.apply(&Mutation::RemoveBlock { id: "a".into() }).unwrap();
    let version = editor.version();

    let outcome = editor.drag_end();

    assert!(matches!(outcome, DropOutcome::Rejected(EditorError::UnknownBlockId(_))));
    assert_eq!(editor.version(), version);
    assert!(editor.history().is_empty());
}

#[test]
fn test_palette_drop_creates_block() {
    let mut editor = editor();
    register_layout(&mut editor);

    let id = editor.drag_start_palette(BlockKind::Divider).unwrap();
    assert!(editor.get(&id).is_none());
    editor.drag_move(Point::new(500.0, 450.0), None);
    let outcome = editor.drag_end();

    let record = outcome.record().unwrap();
    assert_eq!(record.operation, DropOperation::Create);
    assert_eq!(record.source, None);
    assert_eq!(record.block_kind, BlockKind::Divider);
    assert_eq!(children(&editor, ContainerRef::column("cols", 2)), [id.clone()]);
    assert_eq!(editor.get(&id).unwrap().kind, BlockKind::Divider);
}

#[test]
fn test_history_keeps_last_commits() {
    let capacity = 3;
    let mut editor = editor_with(EditorConfig {
        history_capacity: capacity,
        ..EditorConfig::default()
    });
    register_layout(&mut editor);

    let mut versions = Vec::new();
    for i in 0..capacity + 5 {
        let y = if i % 2 == 0 { 350.0 } else { 10.0 };
        let outcome = drag(&mut editor, "a", BlockKind::Text, Point::new(300.0, y));
        versions.push(outcome.record().unwrap().version);
    }

    let kept: Vec<u64> = editor.history().all().iter().map(|r| r.version).collect();
    assert_eq!(kept, versions[versions.len() - capacity..]);
}

#[test]
fn test_undo_redo_drag() {
    let mut editor = editor();
    register_layout(&mut editor);
    let before = editor.snapshot();

    drag(&mut editor, "c", BlockKind::Text, Point::new(500.0, 450.0));
    let after = editor.snapshot();

    assert!(editor.undo().unwrap());
    assert_eq!(*editor.snapshot(), *before);
    assert_eq!(root_children(&editor), ["a", "b", "c", "d", "cols"]);

    assert!(editor.redo().unwrap());
    assert_eq!(*editor.snapshot(), *after);
    assert!(!editor.can_redo());
}

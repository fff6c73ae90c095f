//! Shared fixtures for the editor integration tests

#![allow(dead_code)]

use std::sync::Once;

use maildraft_dnd::{DropSurface, Rect};
use maildraft_document::{BlockKind, ContainerRef};
use maildraft_editor::{Editor, EditorConfig};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness; `RUST_LOG` picks the level
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// ```text
/// root: [a, b, c, d, cols]
/// cols: [[x], [box], []]
/// box:  [inner]
/// ```
pub const TEMPLATE: &str = r#"{
    "root": { "type": "EmailLayout", "data": { "childrenIds": ["a", "b", "c", "d", "cols"] } },
    "a": { "type": "Text", "data": { "props": { "text": "a" } } },
    "b": { "type": "Text", "data": { "props": { "text": "b" } } },
    "c": { "type": "Text", "data": { "props": { "text": "c" } } },
    "d": { "type": "Text", "data": { "props": { "text": "d" } } },
    "cols": {
        "type": "ColumnsContainer",
        "data": { "props": { "columns": [
            { "childrenIds": ["x"] },
            { "childrenIds": ["box"] },
            { "childrenIds": [] }
        ] } }
    },
    "x": { "type": "Image", "data": {} },
    "box": { "type": "Container", "data": { "props": { "childrenIds": ["inner"] } } },
    "inner": { "type": "Button", "data": {} }
}"#;

pub fn editor() -> Editor {
    editor_with(EditorConfig::default())
}

pub fn editor_with(config: EditorConfig) -> Editor {
    init_tracing();
    let mut editor = Editor::new(config).unwrap();
    editor.import_json(TEMPLATE).unwrap();
    editor
}

/// Lay out the template: the root list stacks 100px rows from y = 0, the
/// columns row sits at y = 400 with three 200px columns.
pub fn register_layout(editor: &mut Editor) {
    editor.register_surface(
        DropSurface::new(
            ContainerRef::new("root"),
            BlockKind::EmailLayout.default_accepts(),
            Rect::new(0.0, 0.0, 600.0, 800.0),
        )
        .with_children((0..5).map(|i| Rect::new(0.0, 100.0 * i as f32, 600.0, 100.0)).collect()),
    );

    for slot in 0..3 {
        let children = if slot == 2 {
            vec![]
        } else {
            vec![Rect::new(200.0 * slot as f32, 400.0, 200.0, 80.0)]
        };
        editor.register_surface(
            DropSurface::new(
                ContainerRef::column("cols", slot),
                BlockKind::ColumnsContainer.default_accepts(),
                Rect::new(200.0 * slot as f32, 400.0, 200.0, 100.0),
            )
            .with_children(children),
        );
    }

    editor.register_surface(
        DropSurface::new(
            ContainerRef::new("box"),
            BlockKind::Container.default_accepts(),
            Rect::new(200.0, 400.0, 200.0, 80.0),
        )
        .with_children(vec![Rect::new(200.0, 400.0, 200.0, 40.0)]),
    );
}

pub fn children(editor: &Editor, container: ContainerRef) -> Vec<String> {
    editor.document().children(&container).unwrap().to_vec()
}

pub fn root_children(editor: &Editor) -> Vec<String> {
    children(editor, ContainerRef::new("root"))
}

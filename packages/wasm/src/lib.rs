//! Browser bindings for the editor core.
//!
//! Structured values cross the boundary as JSON strings; hosts poll
//! `version()` to learn that the document changed.

use std::fmt::Display;

use maildraft_dnd::{DropSurface, Point, Rect};
use maildraft_document::json::block_to_json;
use maildraft_document::{BlockKind, ContainerRef};
use maildraft_editor::{DragStart, Editor, EditorConfig, Mutation, Patch};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn from_json<T: DeserializeOwned>(source: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(source).map_err(|e| JsValue::from_str(&format!("Invalid {what}: {e}")))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    // Every value passed here serializes infallibly
    serde_json::to_string(value).unwrap_or_default()
}

fn parse_kind(kind: &str) -> Result<BlockKind, JsValue> {
    kind.parse::<BlockKind>()
        .map_err(|kind| JsValue::from_str(&format!("Unknown block kind: {kind}")))
}

/// One editor session
#[wasm_bindgen]
pub struct EditorHandle {
    editor: Editor,
}

#[wasm_bindgen]
impl EditorHandle {
    /// Create an editor over an empty document. `config` is an optional
    /// JSON `EditorConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<EditorHandle, JsValue> {
        let config = match config {
            Some(source) => EditorConfig::from_json(&source).map_err(js_error)?,
            None => EditorConfig::default(),
        };
        let editor = Editor::new(config).map_err(js_error)?;
        Ok(EditorHandle { editor })
    }

    /// Bumped on every committed change
    pub fn version(&self) -> f64 {
        self.editor.version() as f64
    }

    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, source: &str) -> Result<(), JsValue> {
        self.editor.import_json(source).map(|_| ()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> String {
        self.editor.export_json()
    }

    /// `{ type, data }` of one block
    pub fn block(&self, id: &str) -> Option<String> {
        self.editor.get(id).map(|block| block_to_json(block).to_string())
    }

    /// Apply a JSON `Mutation`
    pub fn apply(&mut self, mutation: &str) -> Result<(), JsValue> {
        let mutation: Mutation = from_json(mutation, "mutation")?;
        self.editor.apply(&mutation).map(|_| ()).map_err(js_error)
    }

    /// Apply `{ id: block | null }` atomically
    #[wasm_bindgen(js_name = applyPatch)]
    pub fn apply_patch(&mut self, patch: &str) -> Result<(), JsValue> {
        let patch = Patch::from_json_str(patch).map_err(js_error)?;
        self.editor.apply_patch(patch).map(|_| ()).map_err(js_error)
    }

    /// Insert an empty block; returns its generated id
    #[wasm_bindgen(js_name = addBlock)]
    pub fn add_block(&mut self, container: &str, index: usize, kind: &str) -> Result<String, JsValue> {
        let container: ContainerRef = from_json(container, "container")?;
        let kind = parse_kind(kind)?;
        self.editor.add_block(container, index, kind).map_err(js_error)
    }

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.editor.undo().map_err(js_error)
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.editor.redo().map_err(js_error)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Register or replace a drop surface
    #[wasm_bindgen(js_name = registerSurface)]
    pub fn register_surface(&mut self, surface: &str) -> Result<(), JsValue> {
        let surface: DropSurface = from_json(surface, "surface")?;
        self.editor.register_surface(surface);
        Ok(())
    }

    #[wasm_bindgen(js_name = unregisterSurface)]
    pub fn unregister_surface(&mut self, container: &str) -> Result<bool, JsValue> {
        let container: ContainerRef = from_json(container, "container")?;
        Ok(self.editor.unregister_surface(&container).is_some())
    }

    #[wasm_bindgen(js_name = clearSurfaces)]
    pub fn clear_surfaces(&mut self) {
        self.editor.clear_surfaces();
    }

    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, event: &str) -> Result<(), JsValue> {
        let event: DragStart = from_json(event, "drag start")?;
        self.editor.drag_start(&event).map_err(js_error)
    }

    /// Start dragging a new block from the palette; returns its future id
    #[wasm_bindgen(js_name = dragStartPalette)]
    pub fn drag_start_palette(&mut self, kind: &str) -> Result<String, JsValue> {
        let kind = parse_kind(kind)?;
        self.editor.drag_start_palette(kind).map_err(js_error)
    }

    /// Feed a pointer sample; returns the current target as JSON, if any
    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(&mut self, x: f32, y: f32, dragged_rect: Option<String>) -> Result<Option<String>, JsValue> {
        let rect = match dragged_rect {
            Some(source) => Some(from_json::<Rect>(&source, "rect")?),
            None => None,
        };
        Ok(self
            .editor
            .drag_move(Point::new(x, y), rect)
            .map(|target| to_json(&target)))
    }

    /// Finish the gesture; returns the outcome as JSON
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self) -> String {
        to_json(&self.editor.drag_end())
    }

    #[wasm_bindgen(js_name = dragCancel)]
    pub fn drag_cancel(&mut self) -> String {
        to_json(&self.editor.drag_cancel())
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.editor.drag().is_dragging()
    }

    /// Recent drops, most recent last
    pub fn history(&self) -> String {
        to_json(&self.editor.history().all())
    }
}

//! # Drop Surfaces
//!
//! A drop surface is one container slot the input layer has laid out on
//! screen and declared eligible to receive dragged blocks. Registrations
//! are replaced wholesale whenever the layout changes.

use std::collections::HashSet;

use maildraft_document::{BlockKind, ContainerRef};
use serde::{Deserialize, Serialize};

use crate::geometry::{Axis, Rect};

/// One registered drop surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropSurface {
    #[serde(rename = "containerId")]
    pub container: ContainerRef,

    pub accepted_kinds: HashSet<BlockKind>,

    #[serde(rename = "boundingRect")]
    pub rect: Rect,

    /// Laid-out children of the slot, in list order
    #[serde(rename = "childRectsInOrder", default)]
    pub child_rects: Vec<Rect>,

    #[serde(default)]
    pub axis: Axis,
}

impl DropSurface {
    pub fn new<I>(container: ContainerRef, accepted_kinds: I, rect: Rect) -> Self
    where
        I: IntoIterator<Item = BlockKind>,
    {
        Self {
            container,
            accepted_kinds: accepted_kinds.into_iter().collect(),
            rect,
            child_rects: Vec::new(),
            axis: Axis::Vertical,
        }
    }

    pub fn with_children(mut self, child_rects: Vec<Rect>) -> Self {
        self.child_rects = child_rects;
        self
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn accepts(&self, kind: BlockKind) -> bool {
        self.accepted_kinds.contains(&kind)
    }
}

/// Registered surfaces, in registration order
#[derive(Debug, Clone, Default)]
pub struct SurfaceRegistry {
    surfaces: Vec<DropSurface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface. Re-registering a container replaces the old
    /// entry in place, keeping its registration order.
    pub fn register(&mut self, surface: DropSurface) {
        match self
            .surfaces
            .iter_mut()
            .find(|s| s.container == surface.container)
        {
            Some(existing) => *existing = surface,
            None => self.surfaces.push(surface),
        }
    }

    pub fn unregister(&mut self, container: &ContainerRef) -> Option<DropSurface> {
        let index = self.surfaces.iter().position(|s| &s.container == container)?;
        Some(self.surfaces.remove(index))
    }

    /// Drop every surface belonging to `block_id`, whatever the slot
    pub fn unregister_block(&mut self, block_id: &str) -> usize {
        let before = self.surfaces.len();
        self.surfaces.retain(|s| s.container.block_id != block_id);
        before - self.surfaces.len()
    }

    pub fn get(&self, container: &ContainerRef) -> Option<&DropSurface> {
        self.surfaces.iter().find(|s| &s.container == container)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DropSurface> {
        self.surfaces.iter()
    }

    pub fn as_slice(&self) -> &[DropSurface] {
        &self.surfaces
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
    }
}

impl<'a> IntoIterator for &'a SurfaceRegistry {
    type Item = &'a DropSurface;
    type IntoIter = std::slice::Iter<'a, DropSurface>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.iter()
    }
}

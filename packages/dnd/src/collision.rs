//! Collision passes used by the resolver, each over an already-filtered
//! candidate list in registration order. Ties go to the earlier candidate.

use std::collections::HashMap;

use maildraft_document::BlockId;

use crate::geometry::{Point, Rect};
use crate::surface::DropSurface;

/// Innermost surface containing the pointer.
///
/// When `depths` knows the tree depth of every hit block, the deepest block
/// wins and rect containment only breaks ties between slots of one block.
/// Otherwise nesting depth of a candidate is the number of other containing
/// candidates whose rect encloses it.
pub(crate) fn pointer_within<'a>(
    candidates: &[&'a DropSurface],
    pointer: Point,
    depths: Option<&HashMap<BlockId, usize>>,
) -> Option<&'a DropSurface> {
    let hits: Vec<&'a DropSurface> = candidates
        .iter()
        .copied()
        .filter(|s| s.rect.contains(pointer))
        .collect();

    let tree_depths: Option<Vec<usize>> = depths.and_then(|depths| {
        hits.iter()
            .map(|s| depths.get(&s.container.block_id).copied())
            .collect()
    });

    let mut best: Option<(&'a DropSurface, (usize, usize))> = None;
    for (i, surface) in hits.iter().enumerate() {
        let enclosing = hits
            .iter()
            .enumerate()
            .filter(|(j, other)| *j != i && other.rect.contains_rect(&surface.rect))
            .count();
        let tree_depth = tree_depths.as_ref().map_or(0, |d| d[i]);
        let depth = (tree_depth, enclosing);

        if best.map_or(true, |(_, best_depth)| depth > best_depth) {
            best = Some((surface, depth));
        }
    }

    best.map(|(surface, _)| surface)
}

/// Surface with the greatest overlap with the dragged element's box
pub(crate) fn rect_intersection<'a>(candidates: &[&'a DropSurface], dragged: &Rect) -> Option<&'a DropSurface> {
    let mut best: Option<(&'a DropSurface, f32)> = None;
    for surface in candidates.iter().copied() {
        let area = surface.rect.intersection_area(dragged);
        if area > 0.0 && best.map_or(true, |(_, best_area)| area > best_area) {
            best = Some((surface, area));
        }
    }
    best.map(|(surface, _)| surface)
}

/// Surface whose center is closest to the pointer
pub(crate) fn closest_center<'a>(candidates: &[&'a DropSurface], pointer: Point) -> Option<&'a DropSurface> {
    let mut best: Option<(&'a DropSurface, f32)> = None;
    for surface in candidates.iter().copied() {
        let distance = surface.rect.center().distance_squared(pointer);
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((surface, distance));
        }
    }
    best.map(|(surface, _)| surface)
}

/// Insertion slot within a surface: the first child whose midpoint along
/// the surface axis lies beyond the pointer, or the list length.
pub(crate) fn insertion_index(surface: &DropSurface, pointer: Point) -> usize {
    let axis = surface.axis;
    let coord = axis.coord(pointer);

    surface
        .child_rects
        .iter()
        .position(|child| coord < axis.midpoint(child))
        .unwrap_or(surface.child_rects.len())
}

//! Read-only access to the map buffer for the renderer.
//!
//! Tile queries take view-relative coordinates and answer from the
//! cell under the current view origin; buffer queries ([`cell`],
//! [`contains`], [`can_smooth`]) take absolute buffer coordinates for
//! renderers that walk the buffer directly.

use fogmap_core::{Cell, FaceId, FOG_SIZE, LAYER_COUNT, MAX_VIEW};

use crate::bigface::BigFaceRegistry;
use crate::VirtualMap;

/// A big face seen from one of its covered tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BigFaceSpan {
    /// The face covering this tile.
    pub face: FaceId,
    /// Tiles of the footprint still extending to the left of this one.
    pub remaining_width: u8,
    /// Tiles of the footprint still extending above this one.
    pub remaining_height: u8,
}

/// A big face seen from its head tile, with its full footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BigFaceHead {
    /// The face headed at this tile.
    pub face: FaceId,
    /// Horizontal footprint in tiles.
    pub width: u8,
    /// Vertical footprint in tiles.
    pub height: u8,
}

/// Dimensions of the whole map buffer in tiles.
#[must_use]
pub fn size(_map: &VirtualMap) -> (usize, usize) {
    (FOG_SIZE, FOG_SIZE)
}

/// Whether `(x, y)` is a valid buffer coordinate.
#[must_use]
pub fn contains(_map: &VirtualMap, x: i32, y: i32) -> bool {
    0 <= x && (x as usize) < FOG_SIZE && 0 <= y && (y as usize) < FOG_SIZE
}

/// Dimensions of the visible view area in tiles; `(0, 0)` until the
/// server has announced a view size.
#[must_use]
pub fn view_area(map: &VirtualMap) -> (u32, u32) {
    (map.view_width as u32, map.view_height as u32)
}

/// Buffer coordinate of view tile `(0, 0)`.
#[must_use]
pub fn view_origin(map: &VirtualMap) -> (i32, i32) {
    (map.player.x, map.player.y)
}

/// Direct access to the cell at buffer coordinate `(x, y)`.
#[must_use]
pub fn cell(map: &VirtualMap, x: i32, y: i32) -> &Cell {
    map.grid.cell(x, y)
}

/// Whether the renderer should smooth layer `layer` of the cell at
/// buffer coordinate `(x, y)` against its neighbors.
///
/// An empty upper layer always smooths (lower-layer terrain shows
/// through); anything else smooths only when the server sent a nonzero
/// smoothing level for it.
#[must_use]
pub fn can_smooth(map: &VirtualMap, x: i32, y: i32, layer: usize) -> bool {
    let cell = map.grid.cell(x, y);
    (cell.heads[layer].face.is_empty() && layer > 0) || cell.smooth[layer] != 0
}

fn has_tile(map: &VirtualMap, x: u32, y: u32, layer: usize) -> bool {
    (x as i32) < map.view_width && (y as i32) < map.view_height && layer < LAYER_COUNT
}

/// Face whose head occupies view tile `(x, y)` on `layer`, or
/// [`FaceId::EMPTY`] if the tile is outside the view area or blank.
#[must_use]
pub fn face(map: &VirtualMap, x: u32, y: u32, layer: usize) -> FaceId {
    if !has_tile(map, x, y, layer) {
        return FaceId::EMPTY;
    }
    let px = map.player.x + x as i32;
    let py = map.player.y + y as i32;
    map.grid.cell(px, py).heads[layer].face
}

/// Big face covering view tile `(x, y)` on `layer`, whether its head
/// lies on a remembered buffer cell or beyond the view edge.
///
/// Takes the map mutably: a covered tile whose head turned out to be
/// obsolete (the head cell went fog of war, or the border head was
/// dropped, while this tile stayed current) is repaired here by
/// clearing the stale face before answering. The server only refreshes
/// heads it considers valid, so a current tile under a stale head is
/// proof the face is gone.
#[must_use]
pub fn bigface(map: &mut VirtualMap, x: u32, y: u32, layer: usize) -> Option<BigFaceSpan> {
    if !has_tile(map, x, y, layer) {
        return None;
    }

    let px = map.player.x + x as i32;
    let py = map.player.y + y as i32;
    let tail = map.grid.cell(px, py).tails[layer];
    if !tail.face.is_empty() {
        let dx = i32::from(tail.dx);
        let dy = i32::from(tail.dy);
        let head = map.grid.cell(px + dx, py + dy).heads[layer];
        debug_assert!(1 <= head.width && 1 <= head.height);
        debug_assert!(dx < i32::from(head.width) && dy < i32::from(head.height));

        let stale = if map.grid.cell(px, py).cleared {
            // This tile is itself fog of war; old information stays.
            false
        } else if (x as i32 + dx) < map.view_width && (y as i32 + dy) < map.view_height {
            // Head tile is in view; a current tail under a fogged head
            // means the face is gone.
            map.grid.cell(px + dx, py + dy).cleared
        } else {
            // Head lies beyond the view edge; it is stale unless the
            // border registry still tracks it. Scrolling can push a
            // head past even the registry's coordinate space, where
            // nothing can be tracking it.
            let hx = x as i32 + dx;
            let hy = y as i32 + dy;
            (hx as usize) >= MAX_VIEW
                || (hy as usize) >= MAX_VIEW
                || map
                    .bigfaces
                    .entry(BigFaceRegistry::index(hx, hy, layer))
                    .head
                    .face
                    .is_empty()
        };

        if !stale {
            return Some(BigFaceSpan {
                face: tail.face,
                remaining_width: head.width - 1 - tail.dx,
                remaining_height: head.height - 1 - tail.dy,
            });
        }

        map.grid.clear_face_from_layer(px + dx, py + dy, layer);
        debug_assert!(map.grid.cell(px, py).tails[layer].face.is_empty());
    }

    let index = BigFaceRegistry::index(x as i32, y as i32, layer);
    let tail = map.bigfaces.entry(index).tail;
    if tail.face.is_empty() {
        return None;
    }

    let head_index = BigFaceRegistry::index(
        x as i32 + i32::from(tail.dx),
        y as i32 + i32::from(tail.dy),
        layer,
    );
    let head = map.bigfaces.entry(head_index).head;
    debug_assert!(tail.dx < head.width && tail.dy < head.height);
    Some(BigFaceSpan {
        face: tail.face,
        remaining_width: head.width - 1 - tail.dx,
        remaining_height: head.height - 1 - tail.dy,
    })
}

/// Head of the big face anchored at view tile `(x, y)` in the border
/// registry, for renderers that draw whole faces and clip themselves.
/// Unlike [`bigface`] this accepts coordinates beyond the view edge,
/// where the registry heads actually live; anything the registry cannot
/// hold at all simply answers `None`.
#[must_use]
pub fn bigface_head(map: &VirtualMap, x: u32, y: u32, layer: usize) -> Option<BigFaceHead> {
    if map.view_width <= 0
        || (x as usize) >= MAX_VIEW
        || (y as usize) >= MAX_VIEW
        || layer >= LAYER_COUNT
    {
        return None;
    }

    let index = BigFaceRegistry::index(x as i32, y as i32, layer);
    let head = map.bigfaces.entry(index).head;
    if head.face.is_empty() {
        return None;
    }
    Some(BigFaceHead {
        face: head.face,
        width: head.width,
        height: head.height,
    })
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative fog-of-war map state for the fogmap client.
//!
//! The [`VirtualMap`] remembers everything the player has ever seen of
//! the game world in a buffer much larger than the visible view area.
//! The protocol decoder mutates it exclusively through [`apply`]; the
//! renderer reads it back through the [`query`] functions. The whole
//! structure is single-threaded by design: it lives on the client's
//! event-loop thread and none of its operations block or perform I/O.

mod animation;
mod bigface;
mod grid;
mod lighting;
mod scroll;
mod sprites;

pub mod query;

use fogmap_core::{
    AnimationId, AnimationMode, Command, Event, FaceCatalog, FaceId, LightingMode, ViewCoord,
    ViewSize, FOG_SIZE, LAYER_COUNT, MAX_VIEW,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use animation::AnimationTable;
use bigface::BigFaceRegistry;
use grid::CellGrid;

/// Seed for the cursor jitter of randomized animations; fixed so that
/// replaying a command stream reproduces the same buffer.
const ANIMATION_JITTER_SEED: u64 = 0x7c3a_91d4_0b56_e8f1;

/// Buffer coordinate of view cell `(0, 0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

/// The client-side virtual map buffer.
///
/// Allocated once; [`Command::NewMap`] and view resizes reset the
/// contents without reallocating.
#[derive(Clone, Debug)]
pub struct VirtualMap {
    pub(crate) grid: CellGrid,
    pub(crate) bigfaces: BigFaceRegistry,
    pub(crate) animations: AnimationTable,
    pub(crate) view_width: i32,
    pub(crate) view_height: i32,
    pub(crate) player: Position,
    pub(crate) lighting: LightingMode,
    pub(crate) rng: ChaCha8Rng,
}

impl VirtualMap {
    /// Creates a blank virtual map for the given lighting mode.
    ///
    /// The view area starts at zero tiles; queries return nothing until
    /// the server announces a size via [`Command::SetViewSize`].
    #[must_use]
    pub fn new(lighting: LightingMode) -> Self {
        let mut map = Self {
            grid: CellGrid::new(),
            bigfaces: BigFaceRegistry::new(),
            animations: AnimationTable::new(),
            view_width: 0,
            view_height: 0,
            player: Position { x: 0, y: 0 },
            lighting,
            rng: ChaCha8Rng::seed_from_u64(ANIMATION_JITTER_SEED),
        };
        map.reset();
        map
    }

    /// Forgets all remembered map state while keeping the allocation.
    ///
    /// Animation definitions survive; they describe faces, not map
    /// content.
    pub fn reset(&mut self) {
        self.grid.clear_all();
        self.bigfaces.reset();
        self.center_player();
    }

    fn center_player(&mut self) {
        self.player = Position {
            x: FOG_SIZE as i32 / 2 - self.view_width / 2,
            y: FOG_SIZE as i32 / 2 - self.view_height / 2,
        };
    }

    fn set_view_size(&mut self, size: ViewSize) {
        self.view_width = size.width() as i32;
        self.view_height = size.height() as i32;
        self.reset();
    }

    fn new_map(&mut self) {
        self.grid.clear_all();
        self.grid.mark_all_need_update();
        while let Some(index) = self.bigfaces.active_head() {
            let entry = *self.bigfaces.entry(index);
            self.clear_bigface_from_layer(
                i32::from(entry.x),
                i32::from(entry.y),
                usize::from(entry.layer),
                false,
            );
        }
    }

    pub(crate) fn assert_view_coord(&self, at: ViewCoord) {
        assert!(
            (at.x() as usize) < MAX_VIEW && (at.y() as usize) < MAX_VIEW,
            "view coordinate out of range: ({}, {})",
            at.x(),
            at.y()
        );
    }

    /// Whether the view-relative coordinate lies inside the visible view
    /// area (as opposed to the surrounding big-face border ring).
    pub(crate) fn is_visible(&self, at: ViewCoord) -> bool {
        (at.x() as i32) < self.view_width && (at.y() as i32) < self.view_height
    }

    pub(crate) fn buffer_position(&self, at: ViewCoord) -> (i32, i32) {
        (self.player.x + at.x() as i32, self.player.y + at.y() as i32)
    }

    /// Server says: nothing occupies this tile.
    fn clear_space(&mut self, at: ViewCoord, faces: &impl FaceCatalog) {
        self.assert_view_coord(at);

        if self.is_visible(at) {
            // A visible tile going blank becomes fog of war; the data
            // stays so the player still sees what was there.
            let (px, py) = self.buffer_position(at);
            if !self.grid.cell(px, py).cleared {
                let cell = self.grid.cell_mut(px, py);
                cell.cleared = true;
                cell.need_update = true;
                for layer in 0..LAYER_COUNT {
                    self.grid.need_update_from_layer(px, py, layer);
                }
            }
        } else {
            let footprint = faces.footprint(FaceId::EMPTY);
            for layer in 0..LAYER_COUNT {
                self.set_bigface(
                    at.x() as i32,
                    at.y() as i32,
                    layer,
                    FaceId::EMPTY,
                    footprint,
                    true,
                );
            }
        }
    }

    /// Drops stale fogged content before fresh per-layer data arrives.
    ///
    /// Runs early in an update batch so that darkness sent ahead of the
    /// layer data does not land on top of stale faces.
    fn clear_old(&mut self, at: ViewCoord) {
        self.assert_view_coord(at);
        if !self.is_visible(at) {
            return;
        }

        let (px, py) = self.buffer_position(at);
        if self.grid.cell(px, py).cleared {
            for layer in 0..LAYER_COUNT {
                self.grid.clear_face_from_layer(px, py, layer);
            }
            let cell = self.grid.cell_mut(px, py);
            cell.darkness = 0;
            cell.have_darkness = false;
        }
    }

    /// Re-checks a tile after a batch of piecewise updates: if every
    /// layer ended up blank and no darkness was sent, the tile becomes
    /// fog of war.
    fn check_space(&mut self, at: ViewCoord) {
        self.assert_view_coord(at);

        let (px, py) = self.buffer_position(at);
        let cell = *self.grid.cell(px, py);
        let blank = !cell.have_darkness
            && cell
                .heads
                .iter()
                .all(|head| head.face.is_empty())
            && cell.tails.iter().all(|tail| tail.face.is_empty());
        if !blank {
            return;
        }

        if self.is_visible(at) && !cell.cleared {
            let cell = self.grid.cell_mut(px, py);
            cell.cleared = true;
            cell.need_update = true;
        }
    }

    /// One-shot update of darkness and all layers of a tile.
    fn set_all_layers(
        &mut self,
        at: ViewCoord,
        darkness: Option<u8>,
        layer_faces: [Option<FaceId>; LAYER_COUNT],
        faces: &impl FaceCatalog,
    ) {
        self.assert_view_coord(at);
        let blank = darkness.is_none() && layer_faces.iter().all(Option::is_none);

        if self.is_visible(at) {
            let (px, py) = self.buffer_position(at);

            if blank {
                // Everything absent means "forget nothing, confirm
                // nothing": mark as fog instead of clearing.
                if !self.grid.cell(px, py).cleared {
                    let cell = self.grid.cell_mut(px, py);
                    cell.cleared = true;
                    cell.need_update = true;
                    for layer in 0..LAYER_COUNT {
                        self.grid.need_update_from_layer(px, py, layer);
                    }
                }
                return;
            }

            self.grid.cell_mut(px, py).need_update = true;
            if self.grid.cell(px, py).cleared {
                self.drop_fogged_content(px, py);
            }
            for (layer, slot) in layer_faces.iter().enumerate() {
                if let Some(face) = slot {
                    self.grid
                        .set_face(px, py, layer, *face, faces.footprint(*face), true);
                }
            }
            self.grid.cell_mut(px, py).cleared = false;
            if let Some(darkness) = darkness {
                self.store_darkness(px, py, darkness);
            }
        } else {
            for (layer, slot) in layer_faces.iter().enumerate() {
                let face = match (blank, slot) {
                    (true, _) => FaceId::EMPTY,
                    (false, Some(face)) => *face,
                    (false, None) => continue,
                };
                self.set_bigface(
                    at.x() as i32,
                    at.y() as i32,
                    layer,
                    face,
                    faces.footprint(face),
                    true,
                );
            }
        }
    }

    /// Assigns a face to one layer of a tile.
    fn set_face_layer(&mut self, at: ViewCoord, layer: usize, face: FaceId, faces: &impl FaceCatalog) {
        self.assert_view_coord(at);
        assert!(layer < LAYER_COUNT);

        if self.is_visible(at) {
            let (px, py) = self.buffer_position(at);
            self.grid.cell_mut(px, py).need_update = true;
            if !face.is_empty() {
                self.grid
                    .set_face(px, py, layer, face, faces.footprint(face), true);
            } else {
                self.grid.clear_face_from_layer(px, py, layer);
            }
            self.grid.cell_mut(px, py).cleared = false;
        } else {
            self.set_bigface(
                at.x() as i32,
                at.y() as i32,
                layer,
                face,
                faces.footprint(face),
                true,
            );
        }
    }

    /// Assigns an animated face to one layer of a tile.
    fn set_anim_layer(
        &mut self,
        at: ViewCoord,
        layer: usize,
        animation: AnimationId,
        mode: AnimationMode,
        speed: u8,
        faces: &impl FaceCatalog,
    ) {
        self.assert_view_coord(at);
        assert!(layer < LAYER_COUNT);

        let (face, cursor) = self.seed_animation(animation, mode, speed);

        if self.is_visible(at) {
            let (px, py) = self.buffer_position(at);
            self.grid.cell_mut(px, py).need_update = true;
            if self.grid.cell(px, py).cleared {
                self.drop_fogged_content(px, py);
            }
            if !face.is_empty() {
                self.grid
                    .set_face(px, py, layer, face, faces.footprint(face), true);
                self.grid.cell_mut(px, py).heads[layer].anim = cursor;
            } else {
                self.grid.clear_face_from_layer(px, py, layer);
            }
            self.grid.cell_mut(px, py).cleared = false;
        } else {
            let x = at.x() as i32;
            let y = at.y() as i32;
            self.set_bigface(x, y, layer, face, faces.footprint(face), true);
            if !face.is_empty() {
                let index = BigFaceRegistry::index(x, y, layer);
                self.bigfaces.entry_mut(index).head.anim = cursor;
            }
        }
    }

    /// Drops every stale layer and darkness of a fogged tile that is
    /// about to receive fresh data.
    fn drop_fogged_content(&mut self, px: i32, py: i32) {
        for layer in 0..LAYER_COUNT {
            self.grid.clear_face_from_layer(px, py, layer);
        }
        let cell = self.grid.cell_mut(px, py);
        cell.darkness = 0;
        cell.have_darkness = false;
    }
}

/// Applies the provided command to the map, mutating state
/// deterministically.
///
/// `faces` supplies the tile footprint of each face; the map never
/// caches footprints, so the catalog must stay consistent for the
/// lifetime of a map.
pub fn apply(
    map: &mut VirtualMap,
    faces: &impl FaceCatalog,
    command: Command,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::SetViewSize { size } => {
            map.set_view_size(size);
            out_events.push(Event::ViewResized { size });
        }
        Command::NewMap => {
            map.new_map();
            out_events.push(Event::BufferWiped);
        }
        Command::Scroll { dx, dy } => map.scroll_view(dx, dy, out_events),
        Command::ClearSpace { at } => map.clear_space(at, faces),
        Command::ClearOld { at } => map.clear_old(at),
        Command::CheckSpace { at } => map.check_space(at),
        Command::SetAllLayers {
            at,
            darkness,
            faces: layer_faces,
        } => map.set_all_layers(at, darkness, layer_faces, faces),
        Command::SetFaceLayer { at, layer, face } => {
            map.set_face_layer(at, usize::from(layer), face, faces);
        }
        Command::SetAnimLayer {
            at,
            layer,
            animation,
            mode,
            speed,
        } => map.set_anim_layer(at, usize::from(layer), animation, mode, speed, faces),
        Command::SetDarkness { at, darkness } => map.set_darkness(at, darkness),
        Command::SetSmooth { at, layer, level } => {
            map.set_smooth(at, usize::from(layer), level);
        }
        Command::DefineAnimation { animation, frames } => {
            map.animations.define(animation, frames);
        }
        Command::Tick => map.animate(faces),
    }
}

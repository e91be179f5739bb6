//! Sprite expansion engine for the live cell store.
//!
//! A face set at its head cell covers `width * height` tiles extending
//! up and to the left of the head. These routines turn a single head
//! write into the matching tail writes and back again, keeping the
//! head/tail aliasing invariant intact.

use fogmap_core::{AnimationCursor, FaceFootprint, FaceId, LAYER_COUNT, MAX_FACE_SIZE};

use crate::grid::CellGrid;

impl CellGrid {
    /// Writes `face` into the head slot at `(x, y, layer)` and expands it
    /// over every covered tail cell.
    ///
    /// When `clear_existing` is set, whatever face currently occupies the
    /// head is cleared first. Animation updates pass `false`: frames of
    /// one animation share a footprint, and clearing would wipe the
    /// per-cell animation cursor.
    pub(crate) fn set_face(
        &mut self,
        x: i32,
        y: i32,
        layer: usize,
        face: FaceId,
        footprint: FaceFootprint,
        clear_existing: bool,
    ) {
        assert!(CellGrid::contains(x, y));
        assert!(layer < LAYER_COUNT);

        if clear_existing {
            self.clear_face_from_layer(x, y, layer);
        }

        let w = i32::from(footprint.width());
        let h = i32::from(footprint.height());

        let head = &mut self.cell_mut(x, y).heads[layer];
        head.face = face;
        head.width = footprint.width();
        head.height = footprint.height();
        self.cell_mut(x, y).need_update = true;
        self.mark_resmooth(x, y, layer);

        for dx in 0..w {
            // (0, 0) is the head itself, not a tail.
            for dy in i32::from(dx == 0)..h {
                let cell = self.cell_mut(x - dx, y - dy);
                cell.tails[layer] = fogmap_core::TailSlot {
                    face,
                    dx: dx as u8,
                    dy: dy as u8,
                };
                cell.need_update = true;
                self.mark_resmooth(x - dx, y - dy, layer);
            }
        }
    }

    /// Clears whatever face occupies the head slot at `(x, y, layer)`,
    /// including its expanded tails.
    pub(crate) fn clear_face_from_layer(&mut self, x: i32, y: i32, layer: usize) {
        assert!(CellGrid::contains(x, y));
        assert!(layer < LAYER_COUNT);

        let head = self.cell(x, y).heads[layer];
        if head.face.is_empty() {
            // A blank layer already is a 1x1 blank face; clearing it
            // again must not disturb any flags.
            debug_assert_eq!((head.width, head.height), (1, 1));
            return;
        }
        self.clear_face(x, y, i32::from(head.width), i32::from(head.height), layer);
    }

    fn clear_face(&mut self, x: i32, y: i32, w: i32, h: i32, layer: usize) {
        assert!(1 <= w && w <= MAX_FACE_SIZE as i32);
        assert!(1 <= h && h <= MAX_FACE_SIZE as i32);
        assert!(CellGrid::contains(x - w + 1, y - h + 1));

        let head_face = self.cell(x, y).heads[layer].face;

        for dx in 0..w {
            for dy in i32::from(dx == 0)..h {
                let tail = self.cell(x - dx, y - dy).tails[layer];

                // A newer face may have overwritten part of this
                // footprint; only erase tails that still belong to us.
                if tail.face == head_face
                    && i32::from(tail.dx) == dx
                    && i32::from(tail.dy) == dy
                {
                    let cell = self.cell_mut(x - dx, y - dy);
                    cell.tails[layer] = fogmap_core::TailSlot::default();
                    cell.need_update = true;
                }
                self.mark_resmooth(x - dx, y - dy, layer);
            }
        }

        let cell = self.cell_mut(x, y);
        cell.heads[layer] = fogmap_core::HeadSlot {
            face: FaceId::EMPTY,
            width: 1,
            height: 1,
            anim: AnimationCursor::default(),
        };
        cell.need_update = true;
        cell.need_resmooth = true;
        self.mark_resmooth(x, y, layer);
    }

    /// Invalidates the cached smoothing blend around `(x, y)`.
    ///
    /// Smoothing blends a cell against its neighbors, so any change to a
    /// smoothed cell must also resmooth the full Moore neighborhood.
    pub(crate) fn mark_resmooth(&mut self, x: i32, y: i32, layer: usize) {
        if self.cell(x, y).smooth[layer] == 0 {
            return;
        }
        for sdx in -1..=1 {
            for sdy in -1..=1 {
                if sdx == 0 && sdy == 0 {
                    continue;
                }
                if CellGrid::contains(x + sdx, y + sdy) {
                    self.cell_mut(x + sdx, y + sdy).need_resmooth = true;
                }
            }
        }
    }

    /// Flags every tile covered by the face headed at `(x, y, layer)`
    /// for repaint, without touching the face data.
    pub(crate) fn need_update_from_layer(&mut self, x: i32, y: i32, layer: usize) {
        assert!(CellGrid::contains(x, y));
        assert!(layer < LAYER_COUNT);

        let head = self.cell(x, y).heads[layer];
        if head.face.is_empty() {
            debug_assert_eq!((head.width, head.height), (1, 1));
            return;
        }

        let w = i32::from(head.width);
        let h = i32::from(head.height);
        assert!(CellGrid::contains(x - w + 1, y - h + 1));
        for dx in 0..w {
            for dy in 0..h {
                self.cell_mut(x - dx, y - dy).need_update = true;
            }
        }
    }
}

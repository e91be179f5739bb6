//! View scrolling and virtual-buffer recentering.
//!
//! Scrolling normally just moves the player anchor inside the buffer.
//! When the view would come too close to the buffer edge, the whole
//! buffer content is bulk-shifted first so the view regains a safety
//! border, and only the newly exposed strip is forgotten.

use fogmap_core::{Event, FOG_BORDER_MIN, FOG_SIZE, MAX_FACE_SIZE, MAX_VIEW};

use crate::VirtualMap;

const FOG: i32 = FOG_SIZE as i32;
const BORDER: i32 = FOG_BORDER_MIN as i32;
const FACE: i32 = MAX_FACE_SIZE as i32;
const VIEW: i32 = MAX_VIEW as i32;

impl VirtualMap {
    /// Moves the view by `(dx, dy)` tiles.
    pub(crate) fn scroll_view(&mut self, dx: i32, dy: i32, out_events: &mut Vec<Event>) {
        if self.recenter(dx, dy, out_events) {
            // The jump wiped the buffer; nothing is left to preserve or
            // to fog, and every border face is gone with it.
            while let Some(index) = self.bigfaces.active_head() {
                let entry = *self.bigfaces.entry(index);
                self.clear_bigface_from_layer(
                    i32::from(entry.x),
                    i32::from(entry.y),
                    usize::from(entry.layer),
                    false,
                );
            }
            out_events.push(Event::Scrolled { dx, dy });
            return;
        }

        // Tiles overlapped by a big face from outside the view area keep
        // their own data but lose or gain occlusion when the view moves;
        // make the renderer refresh them.
        let mut cursor = self.bigfaces.active_head();
        while let Some(index) = cursor {
            let entry = *self.bigfaces.entry(index);
            for fx in 0..i32::from(entry.head.width) {
                for fy in i32::from(fx == 0)..i32::from(entry.head.height) {
                    let cx = i32::from(entry.x) - fx;
                    let cy = i32::from(entry.y) - fy;
                    if 0 <= cx && cx < self.view_width && 0 <= cy && cy < self.view_height {
                        let px = self.player.x + cx;
                        let py = self.player.y + cy;
                        self.grid.cell_mut(px, py).need_update = true;
                    }
                }
            }
            cursor = entry.next;
        }

        self.player.x += dx;
        self.player.y += dy;

        // The server has not yet confirmed the tiles sliding into view;
        // render them as fog until a fresh update arrives.
        if dx > 0 {
            self.fog_columns(self.view_width - dx, self.view_width);
        } else {
            self.fog_columns(0, -dx);
        }
        if dy > 0 {
            self.fog_rows(self.view_height - dy, self.view_height);
        } else {
            self.fog_rows(0, -dy);
        }

        // Every big face is now either fully inside the view (the
        // protocol layer re-sends it into the live grid) or irrelevant
        // to the new border ring.
        while let Some(index) = self.bigfaces.active_head() {
            let entry = *self.bigfaces.entry(index);
            self.clear_bigface_from_layer(
                i32::from(entry.x),
                i32::from(entry.y),
                usize::from(entry.layer),
                false,
            );
        }

        out_events.push(Event::Scrolled { dx, dy });
    }

    fn fog_columns(&mut self, from: i32, to: i32) {
        for x in from.max(0)..to.min(self.view_width) {
            for y in 0..self.view_height {
                let cell = self.grid.cell_mut(self.player.x + x, self.player.y + y);
                cell.cleared = true;
                cell.need_update = true;
            }
        }
    }

    fn fog_rows(&mut self, from: i32, to: i32) {
        for x in 0..self.view_width {
            for y in from.max(0)..to.min(self.view_height) {
                let cell = self.grid.cell_mut(self.player.x + x, self.player.y + y);
                cell.cleared = true;
                cell.need_update = true;
            }
        }
    }

    /// Shifts the buffer content if moving by `(diff_x, diff_y)` would
    /// bring the view area too close to the buffer edge. Returns whether
    /// the move was so large that the buffer was wiped instead.
    ///
    /// Afterwards `[player.x - MAX_FACE_SIZE, player.x + MAX_VIEW]` lies
    /// within the buffer on both axes: the area one update may touch,
    /// plus the reach of a clipped big face, plus a one tile border.
    fn recenter(&mut self, diff_x: i32, diff_y: i32, out_events: &mut Vec<Event>) -> bool {
        let new_x = self.player.x + diff_x;
        let new_y = self.player.y + diff_y;

        // A big face may reach up to MAX_FACE_SIZE - 1 tiles left/above
        // the view, so the near border must keep that much room.
        let mut shift_x = if new_x < FACE {
            BORDER + FACE - new_x
        } else if new_x + VIEW > FOG {
            FOG - BORDER - VIEW - new_x
        } else {
            0
        };
        let mut shift_y = if new_y < FACE {
            BORDER + FACE - new_y
        } else if new_y + VIEW > FOG {
            FOG - BORDER - VIEW - new_y
        } else {
            0
        };

        if shift_x == 0 && shift_y == 0 {
            return false;
        }

        // Once shifting anyway, restore the full minimum border on the
        // other axis too rather than shifting again a few steps later.
        if shift_x == 0 {
            if new_x < BORDER + FACE {
                shift_x = BORDER + FACE - new_x;
            } else if new_x + VIEW + BORDER > FOG {
                shift_x = FOG - BORDER - VIEW - new_x;
            }
        }
        if shift_y == 0 {
            if new_y < BORDER + FACE {
                shift_y = BORDER + FACE - new_y;
            } else if new_y + VIEW + BORDER > FOG {
                shift_y = FOG - BORDER - VIEW - new_y;
            }
        }

        // An extreme teleport would shift everything out of the buffer;
        // wiping it and recentering is equivalent and much cheaper.
        if shift_x <= -FOG || shift_x >= FOG || shift_y <= -FOG || shift_y >= FOG {
            self.grid.clear_all();
            self.player.x = FOG / 2 - self.view_width / 2;
            self.player.y = FOG / 2 - self.view_height / 2;
            out_events.push(Event::BufferWiped);
            return true;
        }

        self.player.x += shift_x;
        self.player.y += shift_y;

        let (src_x, dst_x, len_x) = if shift_x < 0 {
            (-shift_x, 0, FOG + shift_x)
        } else {
            (0, shift_x, FOG - shift_x)
        };
        let (src_y, dst_y, len_y) = if shift_y < 0 {
            (-shift_y, 0, FOG + shift_y)
        } else {
            (0, shift_y, FOG - shift_y)
        };

        // Copy direction matters: when shifting right the source columns
        // must be consumed from the far side first, or a destination
        // column would overwrite a column still waiting to be copied.
        if shift_x <= 0 {
            for i in 0..len_x {
                self.grid
                    .copy_span(src_x + i, src_y, dst_x + i, dst_y, len_y as usize);
            }
        } else {
            for i in (0..len_x).rev() {
                self.grid
                    .copy_span(src_x + i, src_y, dst_x + i, dst_y, len_y as usize);
            }
        }

        // Forget the strips that slid off the preserved region.
        for x in 0..dst_x {
            self.grid.clear_cells(x, 0, FOG_SIZE);
        }
        for x in dst_x + len_x..FOG {
            self.grid.clear_cells(x, 0, FOG_SIZE);
        }
        if shift_y > 0 {
            for i in 0..len_x {
                self.grid.clear_cells(dst_x + i, 0, shift_y as usize);
            }
        } else if shift_y < 0 {
            for i in 0..len_x {
                self.grid
                    .clear_cells(dst_x + i, FOG + shift_y, (-shift_y) as usize);
            }
        }

        out_events.push(Event::Recentered { shift_x, shift_y });
        false
    }
}

//! Darkness and smoothing propagation.
//!
//! Both values are cheap to store; the work here is invalidation. Which
//! neighbors a change dirties depends on how the renderer consumes the
//! value: per-pixel lighting blends axis-adjacent darkness, smoothing
//! blends the full Moore neighborhood.

use fogmap_core::{LightingMode, ViewCoord, LAYER_COUNT};

use crate::grid::CellGrid;
use crate::VirtualMap;

/// Offsets of the eight Moore neighbors.
const MOORE: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

impl VirtualMap {
    /// Updates the darkness of a visible tile.
    ///
    /// Darkness for tiles outside the view area is ignored: if such a
    /// tile scrolls back into sight it is either fog of war (darkness
    /// not rendered) or the server resends it.
    pub(crate) fn set_darkness(&mut self, at: ViewCoord, darkness: u8) {
        self.assert_view_coord(at);
        if !self.is_visible(at) {
            return;
        }
        let (px, py) = self.buffer_position(at);
        self.store_darkness(px, py, darkness);
    }

    /// Stores a darkness value at an absolute buffer coordinate and
    /// invalidates whatever the active lighting mode reads from it.
    pub(crate) fn store_darkness(&mut self, px: i32, py: i32, darkness: u8) {
        let cell = self.grid.cell_mut(px, py);
        cell.have_darkness = true;
        if cell.darkness == darkness {
            return;
        }
        cell.darkness = darkness;
        cell.need_update = true;

        // Per-pixel lighting reads the axis-adjacent neighbors when
        // shading a tile; diagonals are never sampled.
        if self.lighting == LightingMode::Pixel {
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                if CellGrid::contains(px + dx, py + dy) {
                    self.grid.cell_mut(px + dx, py + dy).need_update = true;
                }
            }
        }
    }

    /// Updates the smoothing priority of one layer of a tile.
    pub(crate) fn set_smooth(&mut self, at: ViewCoord, layer: usize, level: u8) {
        self.assert_view_coord(at);
        assert!(layer < LAYER_COUNT);

        let (px, py) = self.buffer_position(at);
        if self.grid.cell(px, py).smooth[layer] == level {
            return;
        }

        for (dx, dy) in MOORE {
            if CellGrid::contains(px + dx, py + dy) {
                self.grid.cell_mut(px + dx, py + dy).need_resmooth = true;
            }
        }
        let cell = self.grid.cell_mut(px, py);
        cell.need_resmooth = true;
        cell.smooth[layer] = level;
    }
}

//! Flat arena of map cells addressed by absolute buffer coordinates.

use fogmap_core::{Cell, FOG_SIZE};

/// Fixed `FOG_SIZE` x `FOG_SIZE` grid of cells, stored column-major so
/// that a column is one contiguous run and the recenter bulk copies
/// operate on whole slices.
#[derive(Clone, Debug)]
pub(crate) struct CellGrid {
    cells: Vec<Cell>,
}

impl CellGrid {
    pub(crate) fn new() -> Self {
        Self {
            cells: vec![Cell::default(); FOG_SIZE * FOG_SIZE],
        }
    }

    /// Reports whether `(x, y)` addresses a cell of the buffer.
    pub(crate) fn contains(x: i32, y: i32) -> bool {
        let bound = FOG_SIZE as i32;
        0 <= x && x < bound && 0 <= y && y < bound
    }

    fn index(x: i32, y: i32) -> usize {
        assert!(
            Self::contains(x, y),
            "buffer coordinate out of range: ({x}, {y})"
        );
        x as usize * FOG_SIZE + y as usize
    }

    pub(crate) fn cell(&self, x: i32, y: i32) -> &Cell {
        &self.cells[Self::index(x, y)]
    }

    pub(crate) fn cell_mut(&mut self, x: i32, y: i32) -> &mut Cell {
        &mut self.cells[Self::index(x, y)]
    }

    /// Resets cells `(x, y)..(x, y + len)` to blank. A blank cell keeps a
    /// 1x1 head footprint per layer so the expansion arithmetic never
    /// sees a zero-sized face.
    pub(crate) fn clear_cells(&mut self, x: i32, y: i32, len: usize) {
        let start = Self::index(x, y);
        assert!(y as usize + len <= FOG_SIZE);
        self.cells[start..start + len].fill(Cell::default());
    }

    /// Resets the whole buffer to blank.
    pub(crate) fn clear_all(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Flags every cell of the buffer for repaint.
    pub(crate) fn mark_all_need_update(&mut self) {
        for cell in &mut self.cells {
            cell.need_update = true;
        }
    }

    /// Copies `len` cells of column `src_x` starting at `src_y` onto
    /// column `dst_x` starting at `dst_y`. Overlapping ranges are safe;
    /// the copy has memmove semantics.
    pub(crate) fn copy_span(&mut self, src_x: i32, src_y: i32, dst_x: i32, dst_y: i32, len: usize) {
        let src = Self::index(src_x, src_y);
        let dst = Self::index(dst_x, dst_y);
        assert!(src_y as usize + len <= FOG_SIZE);
        assert!(dst_y as usize + len <= FOG_SIZE);
        self.cells.copy_within(src..src + len, dst);
    }
}

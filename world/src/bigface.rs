//! Registry of big faces whose head lies outside the visible view area.
//!
//! The registry covers the full `MAX_VIEW` x `MAX_VIEW` view-relative
//! coordinate space; the slots inside the current view area stay unused.
//! Active entries are threaded onto an intrusive doubly linked list
//! (index links, front insertion) so that dropping every big face after
//! a scroll costs O(active entries) rather than a full grid sweep.

use fogmap_core::{
    AnimationCursor, FaceFootprint, FaceId, HeadSlot, TailSlot, LAYER_COUNT, MAX_VIEW,
};

use crate::VirtualMap;

/// One view-relative slot of the registry. A big face with a 2x3
/// footprint occupies exactly six entries: one head and five tails.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BigEntry {
    pub(crate) head: HeadSlot,
    pub(crate) tail: TailSlot,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) layer: u8,
}

#[derive(Clone, Debug)]
pub(crate) struct BigFaceRegistry {
    entries: Vec<BigEntry>,
    active_head: Option<usize>,
}

impl BigFaceRegistry {
    pub(crate) fn new() -> Self {
        let mut entries = Vec::with_capacity(MAX_VIEW * MAX_VIEW * LAYER_COUNT);
        for x in 0..MAX_VIEW {
            for y in 0..MAX_VIEW {
                for layer in 0..LAYER_COUNT {
                    entries.push(BigEntry {
                        head: blank_head(),
                        tail: TailSlot::default(),
                        prev: None,
                        next: None,
                        x: x as u16,
                        y: y as u16,
                        layer: layer as u8,
                    });
                }
            }
        }
        Self {
            entries,
            active_head: None,
        }
    }

    pub(crate) fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.head = blank_head();
            entry.tail = TailSlot::default();
            entry.prev = None;
            entry.next = None;
        }
        self.active_head = None;
    }

    pub(crate) fn index(x: i32, y: i32, layer: usize) -> usize {
        assert!(0 <= x && (x as usize) < MAX_VIEW);
        assert!(0 <= y && (y as usize) < MAX_VIEW);
        assert!(layer < LAYER_COUNT);
        (x as usize * MAX_VIEW + y as usize) * LAYER_COUNT + layer
    }

    pub(crate) fn entry(&self, index: usize) -> &BigEntry {
        &self.entries[index]
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> &mut BigEntry {
        &mut self.entries[index]
    }

    pub(crate) fn active_head(&self) -> Option<usize> {
        self.active_head
    }

    /// Collects the indices of all currently active entries.
    ///
    /// Taken as a snapshot so callers may mutate entries while walking.
    pub(crate) fn active_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut cursor = self.active_head;
        while let Some(index) = cursor {
            indices.push(index);
            cursor = self.entries[index].next;
        }
        indices
    }

    fn link_front(&mut self, index: usize) {
        debug_assert!(self.entries[index].prev.is_none());
        debug_assert!(self.entries[index].next.is_none());
        debug_assert!(self.active_head != Some(index));

        if let Some(head) = self.active_head {
            debug_assert!(self.entries[head].prev.is_none());
            self.entries[head].prev = Some(index);
        }
        self.entries[index].next = self.active_head;
        self.active_head = Some(index);
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let entry = &self.entries[index];
            (entry.prev, entry.next)
        };
        debug_assert!(prev.is_some() || self.active_head == Some(index));

        if let Some(prev) = prev {
            self.entries[prev].next = next;
        }
        if let Some(next) = next {
            self.entries[next].prev = prev;
        }
        if self.active_head == Some(index) {
            debug_assert!(prev.is_none());
            self.active_head = next;
        }
        self.entries[index].prev = None;
        self.entries[index].next = None;
    }
}

fn blank_head() -> HeadSlot {
    HeadSlot {
        face: FaceId::EMPTY,
        width: 1,
        height: 1,
        anim: AnimationCursor::default(),
    }
}

impl VirtualMap {
    /// Writes `face` into the registry head at `(x, y, layer)`, expands
    /// its tails, and keeps the active list consistent with the
    /// "linked iff head face nonzero" invariant.
    ///
    /// Visible tiles overlapped by the face are flagged for repaint on
    /// the live grid, since their occlusion changed even though their own
    /// data did not.
    pub(crate) fn set_bigface(
        &mut self,
        x: i32,
        y: i32,
        layer: usize,
        face: FaceId,
        footprint: FaceFootprint,
        clear_existing: bool,
    ) {
        let index = BigFaceRegistry::index(x, y, layer);

        if clear_existing {
            self.clear_bigface_from_layer(x, y, layer, true);
        }

        let was_linked = !self.bigfaces.entry(index).head.face.is_empty();
        if !face.is_empty() {
            if !was_linked {
                self.bigfaces.link_front(index);
            }
        } else if was_linked {
            // A zero face on the no-clear (animation) path still has to
            // leave the active list; unlinking clears the slot too.
            self.clear_bigface_from_layer(x, y, layer, true);
            return;
        }

        let w = i32::from(footprint.width());
        let h = i32::from(footprint.height());
        {
            let head = &mut self.bigfaces.entry_mut(index).head;
            head.face = face;
            head.width = footprint.width();
            head.height = footprint.height();
        }

        for dx in 0..w.min(x + 1) {
            for dy in i32::from(dx == 0)..h.min(y + 1) {
                let tail_index = BigFaceRegistry::index(x - dx, y - dy, layer);
                self.bigfaces.entry_mut(tail_index).tail = TailSlot {
                    face,
                    dx: dx as u8,
                    dy: dy as u8,
                };
                self.mark_overlapped_view_cell(x - dx, y - dy);
            }
        }
    }

    /// Removes the big face headed at `(x, y, layer)` from the registry,
    /// unlinking it from the active list before clearing its tails.
    pub(crate) fn clear_bigface_from_layer(
        &mut self,
        x: i32,
        y: i32,
        layer: usize,
        set_need_update: bool,
    ) {
        let index = BigFaceRegistry::index(x, y, layer);
        let head = self.bigfaces.entry(index).head;

        if head.face.is_empty() {
            let entry = self.bigfaces.entry(index);
            debug_assert!(entry.prev.is_none());
            debug_assert!(self.bigfaces.active_head() != Some(index));
            debug_assert_eq!((head.width, head.height), (1, 1));
            return;
        }

        self.bigfaces.unlink(index);
        self.clear_bigface(
            x,
            y,
            i32::from(head.width),
            i32::from(head.height),
            layer,
            set_need_update,
        );
    }

    fn clear_bigface(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        layer: usize,
        set_need_update: bool,
    ) {
        let head_index = BigFaceRegistry::index(x, y, layer);
        let head_face = self.bigfaces.entry(head_index).head.face;

        for dx in 0..w.min(x + 1) {
            for dy in i32::from(dx == 0)..h.min(y + 1) {
                let tail_index = BigFaceRegistry::index(x - dx, y - dy, layer);
                let tail = self.bigfaces.entry(tail_index).tail;

                // A newer face may have overwritten part of this
                // footprint; only erase tails that still belong to us.
                if tail.face == head_face
                    && i32::from(tail.dx) == dx
                    && i32::from(tail.dy) == dy
                {
                    self.bigfaces.entry_mut(tail_index).tail = TailSlot::default();
                    if set_need_update {
                        self.mark_overlapped_view_cell(x - dx, y - dy);
                    }
                }
            }
        }

        self.bigfaces.entry_mut(head_index).head = blank_head();
    }

    /// Flags the live-grid cell under view coordinate `(x, y)` for
    /// repaint, if that coordinate is inside the visible view area.
    fn mark_overlapped_view_cell(&mut self, x: i32, y: i32) {
        if 0 <= x && x < self.view_width && 0 <= y && y < self.view_height {
            let px = self.player.x + x;
            let py = self.player.y + y;
            self.grid.cell_mut(px, py).need_update = true;
        }
    }
}

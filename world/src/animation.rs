//! Animation definitions and the fixed-tick animation driver.
//!
//! Each server-defined animation owns a shared cursor that drives
//! synchronized cells; every animated cell additionally carries its own
//! [`AnimationCursor`] so that randomized cells drift independently once
//! seeded. The driver runs off a periodic timer, never off protocol
//! events.

use std::collections::HashMap;

use fogmap_core::{AnimationCursor, AnimationId, AnimationMode, FaceCatalog, FaceId, LAYER_COUNT};
use rand::Rng;

use crate::VirtualMap;

#[derive(Clone, Debug, Default)]
struct AnimationDef {
    frames: Vec<FaceId>,
    speed: u8,
    speed_left: u8,
    phase: u8,
}

/// Mutable per-animation state keyed by animation id.
#[derive(Clone, Debug, Default)]
pub(crate) struct AnimationTable {
    defs: HashMap<AnimationId, AnimationDef>,
}

impl AnimationTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the frame list of an animation, resetting
    /// its shared cursor.
    pub(crate) fn define(&mut self, animation: AnimationId, frames: Vec<FaceId>) {
        let _ = self.defs.insert(
            animation,
            AnimationDef {
                frames,
                ..AnimationDef::default()
            },
        );
    }

    /// Updates the shared tick interval of a synchronized animation. The
    /// definition may arrive after the first cell that uses it.
    fn set_speed(&mut self, animation: AnimationId, speed: u8) {
        self.defs.entry(animation).or_default().speed = speed;
    }

    /// Shared cursor position of an animation: `(phase, ticks elapsed)`.
    fn cursor(&self, animation: AnimationId) -> (u8, u8) {
        self.defs
            .get(&animation)
            .map_or((0, 0), |def| (def.phase, def.speed_left))
    }

    pub(crate) fn frame_count(&self, animation: AnimationId) -> usize {
        self.defs.get(&animation).map_or(0, |def| def.frames.len())
    }

    /// Face displayed at the given phase, or [`FaceId::EMPTY`] when the
    /// phase is out of range or the animation is unknown.
    pub(crate) fn frame(&self, animation: AnimationId, phase: u8) -> FaceId {
        self.defs.get(&animation).map_or(FaceId::EMPTY, |def| {
            def.frames
                .get(usize::from(phase))
                .copied()
                .unwrap_or(FaceId::EMPTY)
        })
    }

    /// Advances the shared cursor of every animation with a nonzero
    /// speed. Cells assigned in synchronized mode copy this cursor, so
    /// advancing it here keeps future assignments in lock-step with
    /// cells already animating.
    pub(crate) fn tick_shared(&mut self) {
        for def in self.defs.values_mut() {
            if def.speed == 0 {
                continue;
            }
            def.speed_left += 1;
            if def.speed_left >= def.speed {
                def.speed_left = 0;
                def.phase = def.phase.wrapping_add(1);
                if usize::from(def.phase) >= def.frames.len() {
                    def.phase = 0;
                }
            }
        }
    }
}

fn advance(cursor: &mut AnimationCursor, frame_count: usize) -> bool {
    cursor.left = cursor.left.wrapping_add(1);
    if cursor.left < cursor.speed {
        return false;
    }
    cursor.left = 0;
    cursor.phase = cursor.phase.wrapping_add(1);
    if usize::from(cursor.phase) >= frame_count {
        cursor.phase = 0;
    }
    true
}

impl VirtualMap {
    /// Resolves the initial face and per-cell cursor for an animation
    /// assignment.
    pub(crate) fn seed_animation(
        &mut self,
        animation: AnimationId,
        mode: AnimationMode,
        speed: u8,
    ) -> (FaceId, AnimationCursor) {
        match mode {
            AnimationMode::Randomized => {
                let frame_count = self.animations.frame_count(animation);
                if frame_count == 0 {
                    return (FaceId::EMPTY, AnimationCursor::default());
                }
                let phase = self.rng.gen_range(0..frame_count) as u8;
                let left = if speed > 0 {
                    self.rng.gen_range(0..speed)
                } else {
                    0
                };
                let face = self.animations.frame(animation, phase);
                (
                    face,
                    AnimationCursor {
                        id: animation,
                        speed,
                        phase,
                        left,
                    },
                )
            }
            AnimationMode::Synchronized => {
                self.animations.set_speed(animation, speed);
                let (phase, left) = self.animations.cursor(animation);
                let face = self.animations.frame(animation, phase);
                (
                    face,
                    AnimationCursor {
                        id: animation,
                        speed,
                        phase,
                        left,
                    },
                )
            }
        }
    }

    /// Advances all animation state by one fixed tick.
    ///
    /// Visible fogged cells are skipped: there is no point animating what
    /// the player cannot currently see. Registry big faces animate
    /// unconditionally, since they track sprites whose animation was set
    /// in motion before their head scrolled off-screen.
    pub(crate) fn animate(&mut self, faces: &impl FaceCatalog) {
        self.animations.tick_shared();

        for x in 0..self.view_width {
            for y in 0..self.view_height {
                let px = self.player.x + x;
                let py = self.player.y + y;
                if self.grid.cell(px, py).cleared {
                    continue;
                }
                for layer in 0..LAYER_COUNT {
                    self.animate_cell(px, py, layer, faces);
                }
            }
        }

        for index in self.bigfaces.active_indices() {
            self.animate_bigface(index, faces);
        }
    }

    fn animate_cell(&mut self, px: i32, py: i32, layer: usize, faces: &impl FaceCatalog) {
        let mut cursor = self.grid.cell(px, py).heads[layer].anim;
        if cursor.id.is_none() {
            return;
        }

        let frames = self.animations.frame_count(cursor.id);
        if !advance(&mut cursor, frames) {
            self.grid.cell_mut(px, py).heads[layer].anim.left = cursor.left;
            return;
        }

        let face = self.animations.frame(cursor.id, cursor.phase);
        if face.is_empty() {
            // Definitions may contain blank frames; render nothing.
            self.grid.clear_face_from_layer(px, py, layer);
        } else {
            // No clear: frames of one animation share a footprint, and
            // clearing would wipe the cursor we are advancing.
            let footprint = faces.footprint(face);
            self.grid.set_face(px, py, layer, face, footprint, false);
            self.grid.cell_mut(px, py).heads[layer].anim = cursor;
        }
    }

    fn animate_bigface(&mut self, index: usize, faces: &impl FaceCatalog) {
        let entry = *self.bigfaces.entry(index);
        let mut cursor = entry.head.anim;
        if cursor.id.is_none() {
            return;
        }

        let frames = self.animations.frame_count(cursor.id);
        if !advance(&mut cursor, frames) {
            self.bigfaces.entry_mut(index).head.anim.left = cursor.left;
            return;
        }

        let x = i32::from(entry.x);
        let y = i32::from(entry.y);
        let layer = usize::from(entry.layer);
        let face = self.animations.frame(cursor.id, cursor.phase);
        if face.is_empty() {
            self.clear_bigface_from_layer(x, y, layer, true);
        } else {
            let footprint = faces.footprint(face);
            self.set_bigface(x, y, layer, face, footprint, false);
            self.bigfaces.entry_mut(index).head.anim = cursor;
        }
    }
}

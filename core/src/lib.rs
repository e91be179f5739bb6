#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the fogmap client map cache.
//!
//! This crate defines the message surface that connects the protocol
//! decoder, the authoritative virtual map, and the renderer. The decoder
//! submits [`Command`] values describing server-driven mutations, the
//! world executes those commands via its `apply` entry point and
//! broadcasts [`Event`] values, and the renderer reads cell state back
//! through the world's query functions. Per-cell data structures live
//! here so that both sides agree on the exact shape of a map cell.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of the square virtual map buffer, in tiles.
///
/// The buffer is deliberately much larger than any viewport so that tiles
/// scrolled out of sight are remembered as "fog of war" instead of being
/// discarded.
pub const FOG_SIZE: usize = 512;

/// Minimum distance between the view area and the buffer edge that a
/// recenter shift re-establishes.
pub const FOG_BORDER_MIN: usize = 128;

/// Maximum footprint of a sprite per axis, in tiles. Larger faces are
/// clipped at their top/left edge.
pub const MAX_FACE_SIZE: usize = 16;

/// Largest view area a server may announce.
pub const MAX_VIEW: usize = 64;

/// Number of rendering layers stored per cell.
pub const LAYER_COUNT: usize = 3;

/// Identifier of a face (sprite image) as assigned by the server.
///
/// Face id 0 means "no face"; see [`FaceId::EMPTY`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(u16);

impl FaceId {
    /// The absent face.
    pub const EMPTY: FaceId = FaceId(0);

    /// Creates a new face identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Reports whether this is the absent face.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Identifier of a server-defined animation.
///
/// Animation id 0 means "not animated".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(u16);

impl AnimationId {
    /// The absent animation.
    pub const NONE: AnimationId = AnimationId(0);

    /// Creates a new animation identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Reports whether this is the absent animation.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

/// Reasons a requested view size is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ViewSizeError {
    /// A dimension of zero tiles cannot be displayed.
    #[error("view dimensions must be at least one tile")]
    Empty,
    /// The request exceeds the largest supported view area.
    #[error("view dimensions may not exceed {MAX_VIEW} tiles")]
    TooLarge,
}

/// Validated dimensions of the visible view area, in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewSize {
    width: u32,
    height: u32,
}

impl ViewSize {
    /// Creates a view size, rejecting dimensions outside `1..=MAX_VIEW`.
    pub fn new(width: u32, height: u32) -> Result<Self, ViewSizeError> {
        if width == 0 || height == 0 {
            return Err(ViewSizeError::Empty);
        }
        if width as usize > MAX_VIEW || height as usize > MAX_VIEW {
            return Err(ViewSizeError::TooLarge);
        }
        Ok(Self { width, height })
    }

    /// Width of the view area in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the view area in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// A view-relative tile coordinate.
///
/// Coordinates range over `[0, MAX_VIEW)`, not the current view size: an
/// update outside the visible area but within `MAX_VIEW` addresses the
/// border ring where big-face heads are tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewCoord {
    x: u32,
    y: u32,
}

impl ViewCoord {
    /// Creates a new view-relative coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Horizontal offset from the view origin.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Vertical offset from the view origin.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Footprint of a face measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceFootprint {
    width: u8,
    height: u8,
}

impl FaceFootprint {
    /// Creates a footprint, clamping both axes into `1..=MAX_FACE_SIZE`.
    ///
    /// Clamping keeps the expansion arithmetic branch-free: a cleared or
    /// unknown face behaves as a 1x1 blank, never as a 0x0.
    #[must_use]
    pub const fn clamped(width: u8, height: u8) -> Self {
        const MAX: u8 = MAX_FACE_SIZE as u8;
        let width = if width < 1 {
            1
        } else if width > MAX {
            MAX
        } else {
            width
        };
        let height = if height < 1 {
            1
        } else if height > MAX {
            MAX
        } else {
            height
        };
        Self { width, height }
    }

    /// Width of the face in tiles.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Height of the face in tiles.
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }
}

/// Source of face metadata consulted when expanding a face over its
/// footprint.
///
/// Image loading and caching live outside the map cache; the world only
/// ever asks how many tiles a face covers.
pub trait FaceCatalog {
    /// Returns the tile footprint of the given face.
    ///
    /// Implementations should return `FaceFootprint::clamped(1, 1)` for
    /// unknown faces.
    fn footprint(&self, face: FaceId) -> FaceFootprint;
}

/// Lighting strategy the active renderer uses.
///
/// Per-pixel lighting blends a tile's darkness with its axis-adjacent
/// neighbors, so darkness changes must dirty those neighbors too.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightingMode {
    /// Each tile is shaded independently.
    Tile,
    /// Tiles are shaded per pixel by blending neighbor darkness.
    Pixel,
}

/// How a cell participates in a server-defined animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationMode {
    /// All cells using the definition advance in lock-step.
    Synchronized,
    /// Each cell starts at a random phase with a random countdown.
    Randomized,
}

/// Per-cell animation bookkeeping stored on a head slot.
///
/// Once initialized from the shared definition, each cell advances
/// independently on every animation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationCursor {
    /// Definition this cell animates with; [`AnimationId::NONE`] if the
    /// cell is static.
    pub id: AnimationId,
    /// Ticks between frame advances.
    pub speed: u8,
    /// Index of the frame currently displayed.
    pub phase: u8,
    /// Ticks accumulated toward the next advance.
    pub left: u8,
}

/// Head slot of a cell layer: the origin tile of a (possibly multi-tile)
/// face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadSlot {
    /// Face anchored at this cell, or [`FaceId::EMPTY`].
    pub face: FaceId,
    /// Horizontal footprint of the face in tiles; 1 for a blank slot.
    pub width: u8,
    /// Vertical footprint of the face in tiles; 1 for a blank slot.
    pub height: u8,
    /// Animation state when the face animates.
    pub anim: AnimationCursor,
}

impl Default for HeadSlot {
    fn default() -> Self {
        Self {
            face: FaceId::EMPTY,
            width: 1,
            height: 1,
            anim: AnimationCursor::default(),
        }
    }
}

/// Tail slot of a cell layer: a tile covered by a multi-tile face whose
/// head lies elsewhere.
///
/// `dx`/`dy` record the offset from this cell back to the owning head;
/// both are 0 when the slot is unused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TailSlot {
    /// Face covering this cell, or [`FaceId::EMPTY`].
    pub face: FaceId,
    /// Offset toward the head along the x axis.
    pub dx: u8,
    /// Offset toward the head along the y axis.
    pub dy: u8,
}

/// One tile of the virtual map buffer.
///
/// For any tail slot holding face `f` at offset `(dx, dy)`, the cell at
/// `(x + dx, y + dy)` holds `f` in its head slot for the same layer with
/// a footprint exceeding the offset. The invariant is violated only
/// transiently inside a single expansion operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Head slots, one per rendering layer.
    pub heads: [HeadSlot; LAYER_COUNT],
    /// Tail slots, one per rendering layer.
    pub tails: [TailSlot; LAYER_COUNT],
    /// Smoothing priority per layer; 0 disables smoothing.
    pub smooth: [u8; LAYER_COUNT],
    /// Darkness level of the tile.
    pub darkness: u8,
    /// Whether the server ever sent darkness for this tile.
    pub have_darkness: bool,
    /// The renderer must repaint this tile.
    pub need_update: bool,
    /// The renderer must recompute this tile's smoothing blend.
    pub need_resmooth: bool,
    /// The tile is remembered from an earlier visit but carries no
    /// current server confirmation ("fog of war").
    pub cleared: bool,
}

/// Commands that express all permissible map cache mutations.
///
/// View-relative coordinates are pre-validated by the protocol decoder to
/// lie within `[0, MAX_VIEW)`; violating that contract is a defect in the
/// decoder and aborts a debug build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Announces the visible view area and resets the buffer around it.
    SetViewSize {
        /// Validated view dimensions.
        size: ViewSize,
    },
    /// Discards all remembered map state for a map change.
    NewMap,
    /// Moves the view by the given tile delta.
    Scroll {
        /// Horizontal movement in tiles; positive is east.
        dx: i32,
        /// Vertical movement in tiles; positive is south.
        dy: i32,
    },
    /// Marks a tile as empty per an explicit server "nothing here".
    ClearSpace {
        /// Tile to blank out.
        at: ViewCoord,
    },
    /// Drops stale fogged layers before fresh data arrives for a tile.
    ClearOld {
        /// Tile about to receive new data.
        at: ViewCoord,
    },
    /// Re-checks a tile after a batch of per-layer updates and fogs it if
    /// every layer ended up blank.
    CheckSpace {
        /// Tile to re-examine.
        at: ViewCoord,
    },
    /// One-shot update of darkness and every layer of a tile.
    ///
    /// All fields absent marks the tile as fogged instead of clearing it.
    SetAllLayers {
        /// Tile to update.
        at: ViewCoord,
        /// New darkness, if the server sent one.
        darkness: Option<u8>,
        /// New face per layer; `None` leaves the layer untouched.
        faces: [Option<FaceId>; LAYER_COUNT],
    },
    /// Assigns a face to one layer of a tile.
    SetFaceLayer {
        /// Tile to update.
        at: ViewCoord,
        /// Layer index in `[0, LAYER_COUNT)`.
        layer: u8,
        /// Face to set; [`FaceId::EMPTY`] clears the layer.
        face: FaceId,
    },
    /// Assigns an animated face to one layer of a tile.
    SetAnimLayer {
        /// Tile to update.
        at: ViewCoord,
        /// Layer index in `[0, LAYER_COUNT)`.
        layer: u8,
        /// Animation definition to play.
        animation: AnimationId,
        /// Whether cells sharing the definition stay in lock-step.
        mode: AnimationMode,
        /// Ticks between frame advances.
        speed: u8,
    },
    /// Updates the darkness of a tile.
    SetDarkness {
        /// Tile to update.
        at: ViewCoord,
        /// New darkness level.
        darkness: u8,
    },
    /// Updates the smoothing priority of one layer of a tile.
    SetSmooth {
        /// Tile to update.
        at: ViewCoord,
        /// Layer index in `[0, LAYER_COUNT)`.
        layer: u8,
        /// New smoothing priority; 0 disables smoothing.
        level: u8,
    },
    /// Registers the frame list of a server-defined animation.
    DefineAnimation {
        /// Definition being registered.
        animation: AnimationId,
        /// Faces displayed in phase order.
        frames: Vec<FaceId>,
    },
    /// Advances all animation state by one fixed tick.
    Tick,
}

/// Events broadcast by the map cache after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// The view area was resized and the buffer reset around it.
    ViewResized {
        /// New view dimensions.
        size: ViewSize,
    },
    /// The view moved within the buffer.
    Scrolled {
        /// Horizontal movement in tiles.
        dx: i32,
        /// Vertical movement in tiles.
        dy: i32,
    },
    /// Buffer contents were bulk-shifted to restore the safety border.
    Recentered {
        /// Horizontal shift applied to all remembered tiles.
        shift_x: i32,
        /// Vertical shift applied to all remembered tiles.
        shift_y: i32,
    },
    /// All remembered map state was discarded.
    BufferWiped,
}

#[cfg(test)]
mod tests {
    use super::{
        AnimationId, Cell, FaceFootprint, FaceId, HeadSlot, ViewCoord, ViewSize, ViewSizeError,
        MAX_FACE_SIZE, MAX_VIEW,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn face_id_round_trips_through_bincode() {
        assert_round_trip(&FaceId::new(42));
    }

    #[test]
    fn animation_id_round_trips_through_bincode() {
        assert_round_trip(&AnimationId::new(7));
    }

    #[test]
    fn view_coord_round_trips_through_bincode() {
        assert_round_trip(&ViewCoord::new(5, 9));
    }

    #[test]
    fn view_size_round_trips_through_bincode() {
        let size = ViewSize::new(11, 11).expect("valid size");
        assert_round_trip(&size);
    }

    #[test]
    fn view_size_rejects_empty_dimensions() {
        assert_eq!(ViewSize::new(0, 11), Err(ViewSizeError::Empty));
        assert_eq!(ViewSize::new(11, 0), Err(ViewSizeError::Empty));
    }

    #[test]
    fn view_size_rejects_oversized_dimensions() {
        let over = MAX_VIEW as u32 + 1;
        assert_eq!(ViewSize::new(over, 11), Err(ViewSizeError::TooLarge));
        assert_eq!(ViewSize::new(11, over), Err(ViewSizeError::TooLarge));
    }

    #[test]
    fn footprint_clamps_into_supported_range() {
        let tiny = FaceFootprint::clamped(0, 0);
        assert_eq!((tiny.width(), tiny.height()), (1, 1));

        let huge = FaceFootprint::clamped(u8::MAX, u8::MAX);
        assert_eq!(huge.width() as usize, MAX_FACE_SIZE);
        assert_eq!(huge.height() as usize, MAX_FACE_SIZE);

        let plain = FaceFootprint::clamped(2, 3);
        assert_eq!((plain.width(), plain.height()), (2, 3));
    }

    #[test]
    fn default_cell_is_a_blank_one_by_one() {
        let cell = Cell::default();
        for head in &cell.heads {
            assert_eq!(head.face, FaceId::EMPTY);
            assert_eq!((head.width, head.height), (1, 1));
        }
        for tail in &cell.tails {
            assert_eq!(tail.face, FaceId::EMPTY);
            assert_eq!((tail.dx, tail.dy), (0, 0));
        }
        assert!(!cell.cleared);
    }

    #[test]
    fn blank_head_slot_reports_unit_footprint() {
        let head = HeadSlot::default();
        assert_eq!((head.width, head.height), (1, 1));
    }
}

use fogmap_core::{
    Command, FaceCatalog, FaceFootprint, FaceId, LightingMode, ViewCoord, ViewSize,
};
use fogmap_world::{apply, query, VirtualMap};

struct Catalog;

impl FaceCatalog for Catalog {
    fn footprint(&self, _face: FaceId) -> FaceFootprint {
        FaceFootprint::clamped(1, 1)
    }
}

fn sized_map(lighting: LightingMode) -> VirtualMap {
    let mut map = VirtualMap::new(lighting);
    let mut events = Vec::new();
    apply(
        &mut map,
        &Catalog,
        Command::SetViewSize {
            size: ViewSize::new(11, 11).expect("valid view size"),
        },
        &mut events,
    );
    map
}

fn set_darkness(map: &mut VirtualMap, x: u32, y: u32, darkness: u8) {
    let mut events = Vec::new();
    apply(
        map,
        &Catalog,
        Command::SetDarkness {
            at: ViewCoord::new(x, y),
            darkness,
        },
        &mut events,
    );
}

fn set_smooth(map: &mut VirtualMap, x: u32, y: u32, level: u8) {
    let mut events = Vec::new();
    apply(
        map,
        &Catalog,
        Command::SetSmooth {
            at: ViewCoord::new(x, y),
            layer: 0,
            level,
        },
        &mut events,
    );
}

#[test]
fn darkness_is_stored_with_its_presence_flag() {
    let mut map = sized_map(LightingMode::Tile);
    set_darkness(&mut map, 5, 5, 180);

    let (ox, oy) = query::view_origin(&map);
    let cell = query::cell(&map, ox + 5, oy + 5);
    assert!(cell.have_darkness);
    assert_eq!(cell.darkness, 180);
    assert!(cell.need_update);
}

#[test]
fn tile_lighting_leaves_neighbors_alone() {
    let mut map = sized_map(LightingMode::Tile);
    set_darkness(&mut map, 5, 5, 180);

    let (ox, oy) = query::view_origin(&map);
    assert!(!query::cell(&map, ox + 4, oy + 5).need_update);
    assert!(!query::cell(&map, ox + 5, oy + 4).need_update);
}

#[test]
fn pixel_lighting_invalidates_axis_neighbors() {
    let mut map = sized_map(LightingMode::Pixel);
    set_darkness(&mut map, 5, 5, 180);

    let (ox, oy) = query::view_origin(&map);
    for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
        assert!(
            query::cell(&map, ox + 5 + dx, oy + 5 + dy).need_update,
            "axis neighbor ({dx}, {dy}) must be repainted"
        );
    }
    // Diagonals are never sampled by the shader.
    assert!(!query::cell(&map, ox + 4, oy + 4).need_update);
}

#[test]
fn smoothing_levels_gate_the_can_smooth_query() {
    let mut map = sized_map(LightingMode::Tile);
    let (ox, oy) = query::view_origin(&map);

    // An empty upper layer always smooths; the ground layer needs an
    // explicit level.
    assert!(query::can_smooth(&map, ox + 5, oy + 5, 1));
    assert!(!query::can_smooth(&map, ox + 5, oy + 5, 0));

    set_smooth(&mut map, 5, 5, 3);
    assert!(query::can_smooth(&map, ox + 5, oy + 5, 0));
    assert_eq!(query::cell(&map, ox + 5, oy + 5).smooth[0], 3);
}

#[test]
fn smoothing_changes_invalidate_the_neighborhood() {
    let mut map = sized_map(LightingMode::Tile);
    set_smooth(&mut map, 5, 5, 3);

    let (ox, oy) = query::view_origin(&map);
    for dx in -1..=1 {
        for dy in -1..=1 {
            assert!(
                query::cell(&map, ox + 5 + dx, oy + 5 + dy).need_resmooth,
                "neighbor ({dx}, {dy}) must recompute its blend"
            );
        }
    }
    assert!(!query::cell(&map, ox + 7, oy + 5).need_resmooth);
}

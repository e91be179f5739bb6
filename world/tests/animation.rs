use fogmap_core::{
    AnimationId, AnimationMode, Command, FaceCatalog, FaceFootprint, FaceId, LightingMode,
    ViewCoord, ViewSize,
};
use fogmap_world::{apply, query, VirtualMap};

struct Catalog;

impl FaceCatalog for Catalog {
    fn footprint(&self, face: FaceId) -> FaceFootprint {
        match face.get() {
            30..=39 => FaceFootprint::clamped(2, 2),
            _ => FaceFootprint::clamped(1, 1),
        }
    }
}

const FLAME: AnimationId = AnimationId::new(1);

fn animated_map() -> VirtualMap {
    let mut map = VirtualMap::new(LightingMode::Tile);
    let mut events = Vec::new();
    apply(
        &mut map,
        &Catalog,
        Command::SetViewSize {
            size: ViewSize::new(11, 11).expect("valid view size"),
        },
        &mut events,
    );
    apply(
        &mut map,
        &Catalog,
        Command::DefineAnimation {
            animation: FLAME,
            frames: vec![FaceId::new(10), FaceId::new(11), FaceId::new(12)],
        },
        &mut events,
    );
    map
}

fn set_anim(map: &mut VirtualMap, x: u32, y: u32, mode: AnimationMode, speed: u8) {
    let mut events = Vec::new();
    apply(
        map,
        &Catalog,
        Command::SetAnimLayer {
            at: ViewCoord::new(x, y),
            layer: 0,
            animation: FLAME,
            mode,
            speed,
        },
        &mut events,
    );
}

fn tick(map: &mut VirtualMap) {
    let mut events = Vec::new();
    apply(map, &Catalog, Command::Tick, &mut events);
}

#[test]
fn synchronized_cells_advance_in_lock_step() {
    let mut map = animated_map();
    set_anim(&mut map, 2, 2, AnimationMode::Synchronized, 1);
    set_anim(&mut map, 8, 8, AnimationMode::Synchronized, 1);

    assert_eq!(query::face(&map, 2, 2, 0), FaceId::new(10));
    assert_eq!(query::face(&map, 8, 8, 0), FaceId::new(10));

    tick(&mut map);
    assert_eq!(query::face(&map, 2, 2, 0), FaceId::new(11));
    assert_eq!(query::face(&map, 8, 8, 0), FaceId::new(11));

    tick(&mut map);
    tick(&mut map);
    // Wrapped around the three frames.
    assert_eq!(query::face(&map, 2, 2, 0), FaceId::new(10));
    assert_eq!(query::face(&map, 8, 8, 0), FaceId::new(10));
}

#[test]
fn late_joiners_start_at_the_shared_phase() {
    let mut map = animated_map();
    set_anim(&mut map, 2, 2, AnimationMode::Synchronized, 1);
    tick(&mut map);

    set_anim(&mut map, 8, 8, AnimationMode::Synchronized, 1);
    assert_eq!(
        query::face(&map, 8, 8, 0),
        query::face(&map, 2, 2, 0),
        "a late joiner must not restart the cycle"
    );
}

#[test]
fn speed_spreads_frame_advances_over_ticks() {
    let mut map = animated_map();
    set_anim(&mut map, 2, 2, AnimationMode::Synchronized, 3);

    tick(&mut map);
    tick(&mut map);
    assert_eq!(query::face(&map, 2, 2, 0), FaceId::new(10));
    tick(&mut map);
    assert_eq!(query::face(&map, 2, 2, 0), FaceId::new(11));
}

#[test]
fn randomized_cells_drift_independently_of_the_shared_cursor() {
    let mut map = animated_map();
    set_anim(&mut map, 2, 2, AnimationMode::Randomized, 1);

    let face = query::face(&map, 2, 2, 0);
    assert!(
        (10..=12).contains(&face.get()),
        "randomized start must be a frame of the animation, got {face:?}"
    );

    // Whatever the phase, three ticks at speed 1 come back around.
    tick(&mut map);
    tick(&mut map);
    tick(&mut map);
    assert_eq!(query::face(&map, 2, 2, 0), face);
}

#[test]
fn fogged_cells_do_not_animate() {
    let mut map = animated_map();
    let mut events = Vec::new();
    set_anim(&mut map, 2, 2, AnimationMode::Synchronized, 1);
    apply(
        &mut map,
        &Catalog,
        Command::ClearSpace {
            at: ViewCoord::new(2, 2),
        },
        &mut events,
    );

    tick(&mut map);
    assert_eq!(
        query::face(&map, 2, 2, 0),
        FaceId::new(10),
        "fog of war must freeze the remembered frame"
    );
}

#[test]
fn border_big_faces_keep_animating() {
    let mut map = animated_map();
    let mut events = Vec::new();
    apply(
        &mut map,
        &Catalog,
        Command::DefineAnimation {
            animation: AnimationId::new(2),
            frames: vec![FaceId::new(30), FaceId::new(31)],
        },
        &mut events,
    );
    apply(
        &mut map,
        &Catalog,
        Command::SetAnimLayer {
            at: ViewCoord::new(11, 5),
            layer: 0,
            animation: AnimationId::new(2),
            mode: AnimationMode::Synchronized,
            speed: 1,
        },
        &mut events,
    );

    let head = query::bigface_head(&map, 11, 5, 0).expect("registry head");
    assert_eq!(head.face, FaceId::new(30));

    tick(&mut map);
    let head = query::bigface_head(&map, 11, 5, 0).expect("registry head");
    assert_eq!(head.face, FaceId::new(31));

    // The footprint stays expanded across frames.
    let span = query::bigface(&mut map, 10, 5, 0).expect("visible tail");
    assert_eq!(span.face, FaceId::new(31));
}

#[test]
fn a_blank_frame_clears_the_layer_and_stops_the_cell() {
    let mut map = animated_map();
    let mut events = Vec::new();
    apply(
        &mut map,
        &Catalog,
        Command::DefineAnimation {
            animation: AnimationId::new(3),
            frames: vec![FaceId::new(20), FaceId::EMPTY],
        },
        &mut events,
    );
    apply(
        &mut map,
        &Catalog,
        Command::SetAnimLayer {
            at: ViewCoord::new(4, 4),
            layer: 0,
            animation: AnimationId::new(3),
            mode: AnimationMode::Synchronized,
            speed: 1,
        },
        &mut events,
    );
    assert_eq!(query::face(&map, 4, 4, 0), FaceId::new(20));

    tick(&mut map);
    assert_eq!(query::face(&map, 4, 4, 0), FaceId::EMPTY);

    // Clearing the layer also dropped the cell's cursor; only a fresh
    // assignment restarts the animation.
    tick(&mut map);
    assert_eq!(query::face(&map, 4, 4, 0), FaceId::EMPTY);
}

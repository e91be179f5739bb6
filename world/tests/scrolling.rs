use fogmap_core::{
    Command, Event, FaceCatalog, FaceFootprint, FaceId, LightingMode, ViewCoord, ViewSize,
    FOG_BORDER_MIN, FOG_SIZE, MAX_FACE_SIZE,
};
use fogmap_world::{apply, query, VirtualMap};

struct Catalog;

impl FaceCatalog for Catalog {
    fn footprint(&self, face: FaceId) -> FaceFootprint {
        match face.get() {
            42 => FaceFootprint::clamped(2, 3),
            8 => FaceFootprint::clamped(16, 1),
            _ => FaceFootprint::clamped(1, 1),
        }
    }
}

fn sized_map(width: u32, height: u32) -> VirtualMap {
    let mut map = VirtualMap::new(LightingMode::Tile);
    let mut events = Vec::new();
    apply(
        &mut map,
        &Catalog,
        Command::SetViewSize {
            size: ViewSize::new(width, height).expect("valid view size"),
        },
        &mut events,
    );
    map
}

fn set_face(map: &mut VirtualMap, x: u32, y: u32, face: u16) {
    let mut events = Vec::new();
    apply(
        map,
        &Catalog,
        Command::SetFaceLayer {
            at: ViewCoord::new(x, y),
            layer: 0,
            face: FaceId::new(face),
        },
        &mut events,
    );
}

fn scroll(map: &mut VirtualMap, dx: i32, dy: i32) -> Vec<Event> {
    let mut events = Vec::new();
    apply(map, &Catalog, Command::Scroll { dx, dy }, &mut events);
    events
}

#[test]
fn scrolling_moves_the_view_anchor_without_losing_data() {
    let mut map = sized_map(11, 11);
    let origin = query::view_origin(&map);
    set_face(&mut map, 5, 5, 9);

    for _ in 0..10 {
        let events = scroll(&mut map, 1, 0);
        assert_eq!(events, vec![Event::Scrolled { dx: 1, dy: 0 }]);
    }

    assert_eq!(query::view_origin(&map), (origin.0 + 10, origin.1));

    // The face now lies ten tiles west of the view; its buffer cell is
    // untouched.
    let cell = query::cell(&map, origin.0 + 5, origin.1 + 5);
    assert_eq!(cell.heads[0].face, FaceId::new(9));
    // It re-enters the view, as remembered fog, if the player walks back.
    let _ = scroll(&mut map, -10, 0);
    assert_eq!(query::face(&map, 5, 5, 0), FaceId::new(9));
}

#[test]
fn tiles_entering_the_view_start_as_fog() {
    let mut map = sized_map(11, 11);
    let _ = scroll(&mut map, 1, 0);

    let (ox, oy) = query::view_origin(&map);
    for y in 0..11 {
        assert!(
            query::cell(&map, ox + 10, oy + y).cleared,
            "leading column row {y} must be fog"
        );
    }
    // The rest of the view is untouched.
    assert!(!query::cell(&map, ox + 5, oy + 5).cleared);
}

#[test]
fn diagonal_scroll_fogs_both_leading_edges() {
    let mut map = sized_map(11, 11);
    let _ = scroll(&mut map, -1, 1);

    let (ox, oy) = query::view_origin(&map);
    for y in 0..11 {
        assert!(query::cell(&map, ox, oy + y).cleared);
    }
    for x in 0..11 {
        assert!(query::cell(&map, ox + x, oy + 10).cleared);
    }
}

#[test]
fn scrolling_drops_border_big_faces() {
    let mut map = sized_map(11, 11);
    set_face(&mut map, 11, 5, 42);
    assert!(query::bigface_head(&map, 11, 5, 0).is_some());

    let _ = scroll(&mut map, 1, 0);

    assert!(query::bigface_head(&map, 11, 5, 0).is_none());
    assert!(query::bigface(&mut map, 10, 5, 0).is_none());
}

#[test]
fn westward_scroll_repairs_faces_pushed_past_the_registry_edge() {
    // With a full-width view a wide face can straddle the right edge so
    // closely that scrolling west pushes its head beyond the registry's
    // own coordinate space. Its surviving tails must then answer as
    // stale, not look the head up where nothing can track it.
    let mut map = sized_map(64, 64);
    set_face(&mut map, 60, 5, 8);

    let _ = scroll(&mut map, -10, 0);

    // The head now sits at view column 70; every covered tile reads as
    // gone and the stale data is scrubbed on the first lookup.
    assert!(query::bigface(&mut map, 56, 5, 0).is_none());
    let (ox, oy) = query::view_origin(&map);
    assert!(query::cell(&map, ox + 56, oy + 5).tails[0].face.is_empty());
    assert!(query::cell(&map, ox + 70, oy + 5).heads[0].face.is_empty());
}

#[test]
fn recenter_preserves_content_at_shifted_coordinates() {
    let mut map = sized_map(11, 11);
    set_face(&mut map, 5, 5, 9);
    let (start_x, start_y) = query::view_origin(&map);

    // Walk east until the buffer has to shift underneath the view.
    let buffer = FOG_SIZE as i32;
    let mut recentered = None;
    let mut steps = 0;
    while recentered.is_none() {
        steps += 1;
        assert!(steps < buffer, "recenter never triggered");
        for event in scroll(&mut map, 1, 0) {
            if let Event::Recentered { shift_x, shift_y } = event {
                recentered = Some((shift_x, shift_y));
            }
        }
    }

    let (shift_x, shift_y) = recentered.expect("recenter event");
    assert!(shift_x < 0, "eastward walk shifts content west");
    assert_eq!(shift_y, 0);

    // The remembered face moved with the shift.
    let cell = query::cell(&map, start_x + 5 + shift_x, start_y + 5 + shift_y);
    assert_eq!(cell.heads[0].face, FaceId::new(9));

    // The view regained its full safety border.
    let (ox, _) = query::view_origin(&map);
    assert!(ox + 11 + (FOG_BORDER_MIN as i32) <= buffer);
    assert!(ox >= MAX_FACE_SIZE as i32);
}

#[test]
fn recenter_restores_the_border_on_the_other_axis_too() {
    let mut map = sized_map(11, 11);

    // Drift south far enough to eat into the vertical border, then walk
    // east until the horizontal recenter fires; the vertical border must
    // be restored in the same shift.
    for _ in 0..80 {
        let _ = scroll(&mut map, 0, 1);
    }
    let mut recentered = None;
    for _ in 0..FOG_SIZE {
        for event in scroll(&mut map, 1, 0) {
            if let Event::Recentered { shift_x, shift_y } = event {
                recentered = Some((shift_x, shift_y));
            }
        }
        if recentered.is_some() {
            break;
        }
    }
    let (shift_x, shift_y) = recentered.expect("recenter never triggered");
    assert!(shift_x < 0);
    assert!(shift_y < 0, "secondary axis must regain its border");

    let border = FOG_BORDER_MIN as i32;
    let face = MAX_FACE_SIZE as i32;
    let (ox, oy) = query::view_origin(&map);
    assert!(ox >= face && ox + 11 + border <= FOG_SIZE as i32);
    assert!(oy >= face && oy + 11 + border <= FOG_SIZE as i32);
}

#[test]
fn huge_scroll_wipes_the_buffer_instead_of_shifting() {
    let mut map = sized_map(11, 11);
    set_face(&mut map, 5, 5, 9);

    let events = scroll(&mut map, 3 * FOG_SIZE as i32, 0);
    assert!(
        events.contains(&Event::BufferWiped),
        "teleport must wipe, got {events:?}"
    );

    // Everything is forgotten and the view is centered again.
    let (ox, oy) = query::view_origin(&map);
    assert_eq!((ox, oy), (FOG_SIZE as i32 / 2 - 5, FOG_SIZE as i32 / 2 - 5));
    assert_eq!(query::face(&map, 5, 5, 0), FaceId::EMPTY);
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line inspector for the fog-of-war map buffer.
//!
//! Drives a map with a synthetic command stream (a bordered room, an
//! animated torch, a big tree overhanging the view edge) and prints the
//! view as ASCII after each step of a scripted walk. Useful for eyeing
//! scroll, recenter and fog-of-war behavior without a graphical client.

use anyhow::{Context, Result};
use clap::Parser;
use fogmap_core::{
    AnimationId, AnimationMode, Command, Event, FaceCatalog, FaceFootprint, FaceId, LightingMode,
    ViewCoord, ViewSize, LAYER_COUNT,
};
use fogmap_world::{apply, query, VirtualMap};

/// Inspect the virtual map buffer from the terminal.
#[derive(Debug, Parser)]
#[command(name = "fogmap", version, about)]
struct Args {
    /// View width in tiles.
    #[arg(long, default_value_t = 15)]
    width: u32,

    /// View height in tiles.
    #[arg(long, default_value_t = 11)]
    height: u32,

    /// Tiles to walk east during the scripted run.
    #[arg(long, default_value_t = 6)]
    steps: u32,

    /// Use per-pixel lighting invalidation instead of per-tile.
    #[arg(long)]
    pixel_lighting: bool,

    /// Print dirty-flag counts after every step.
    #[arg(long)]
    verbose: bool,
}

const WALL: u16 = 2;
const FLOOR: u16 = 1;
const TORCH_ANIM: AnimationId = AnimationId::new(1);
const TREE: u16 = 50;

/// Face footprints of the synthetic tileset.
struct DemoTiles;

impl FaceCatalog for DemoTiles {
    fn footprint(&self, face: FaceId) -> FaceFootprint {
        match face.get() {
            TREE => FaceFootprint::clamped(2, 2),
            _ => FaceFootprint::clamped(1, 1),
        }
    }
}

fn glyph(face: FaceId) -> char {
    match face.get() {
        0 => ' ',
        FLOOR => '.',
        WALL => '#',
        10..=12 => '*',
        TREE => 'T',
        _ => '?',
    }
}

fn render(map: &mut VirtualMap, args: &Args) -> String {
    let (ox, oy) = query::view_origin(map);
    let mut out = String::new();
    for y in 0..args.height {
        for x in 0..args.width {
            let top = (0..LAYER_COUNT)
                .rev()
                .map(|layer| query::face(map, x, y, layer))
                .find(|face| !face.is_empty());
            let mut ch = glyph(top.unwrap_or(FaceId::EMPTY));

            if ch == ' ' {
                if let Some(span) = query::bigface(map, x, y, 0) {
                    ch = glyph(span.face).to_ascii_lowercase();
                }
            }

            if query::cell(map, ox + x as i32, oy + y as i32).cleared {
                ch = match ch {
                    ' ' => ' ',
                    _ => ',',
                };
            }
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

fn dirty_counts(map: &VirtualMap, args: &Args) -> (usize, usize) {
    let (ox, oy) = query::view_origin(map);
    let mut update = 0;
    let mut resmooth = 0;
    for x in 0..args.width as i32 {
        for y in 0..args.height as i32 {
            let cell = query::cell(map, ox + x, oy + y);
            if cell.need_update {
                update += 1;
            }
            if cell.need_resmooth {
                resmooth += 1;
            }
        }
    }
    (update, resmooth)
}

fn feed(map: &mut VirtualMap, command: Command, events: &mut Vec<Event>) {
    apply(map, &DemoTiles, command, events);
}

/// Sends a bordered room with a torch and an overhanging tree.
fn build_room(map: &mut VirtualMap, args: &Args, events: &mut Vec<Event>) {
    for x in 0..args.width {
        for y in 0..args.height {
            let border =
                x == 0 || y == 0 || x == args.width - 1 || y == args.height - 1;
            let face = if border { WALL } else { FLOOR };
            feed(
                map,
                Command::SetFaceLayer {
                    at: ViewCoord::new(x, y),
                    layer: 0,
                    face: FaceId::new(face),
                },
                events,
            );
        }
    }

    feed(
        map,
        Command::DefineAnimation {
            animation: TORCH_ANIM,
            frames: vec![FaceId::new(10), FaceId::new(11), FaceId::new(12)],
        },
        events,
    );
    feed(
        map,
        Command::SetAnimLayer {
            at: ViewCoord::new(args.width / 2, args.height / 2),
            layer: 1,
            animation: TORCH_ANIM,
            mode: AnimationMode::Synchronized,
            speed: 1,
        },
        events,
    );

    // A 2x2 tree headed just beyond the right view edge; its canopy
    // reaches back into the rightmost visible column.
    feed(
        map,
        Command::SetFaceLayer {
            at: ViewCoord::new(args.width, 2),
            layer: 0,
            face: FaceId::new(TREE),
        },
        events,
    );
}

fn main() -> Result<()> {
    let args = Args::parse();
    let size = ViewSize::new(args.width, args.height)
        .context("unsupported view size")?;
    let lighting = if args.pixel_lighting {
        LightingMode::Pixel
    } else {
        LightingMode::Tile
    };

    let mut map = VirtualMap::new(lighting);
    let mut events = Vec::new();
    feed(&mut map, Command::SetViewSize { size }, &mut events);
    build_room(&mut map, &args, &mut events);

    println!("initial view ({}x{}):", args.width, args.height);
    print!("{}", render(&mut map, &args));

    for step in 1..=args.steps {
        events.clear();
        feed(&mut map, Command::Scroll { dx: 1, dy: 0 }, &mut events);
        feed(&mut map, Command::Tick, &mut events);

        println!("\nafter step {step} east:");
        print!("{}", render(&mut map, &args));
        for event in &events {
            println!("  event: {event:?}");
        }
        if args.verbose {
            let (update, resmooth) = dirty_counts(&map, &args);
            println!("  dirty: {update} repaint, {resmooth} resmooth");
        }
    }

    Ok(())
}

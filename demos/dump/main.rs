//! Floorgraph dump: loads a saved floorplan (or builds a sample) and prints
//! its rooms and wall faces.
//!
//! Usage:
//! ```text
//! cargo run --example dump                      # built-in sample plan
//! cargo run --example dump -- plan.json         # a saved document
//! RUST_LOG=floorgraph=debug cargo run --example dump
//! ```

use std::error::Error;

use floorgraph::Floorplan;

fn main() -> Result<(), Box<dyn Error>> {
    // Default: WARN for everything, INFO for floorgraph.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("floorgraph=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut plan = Floorplan::new();
    match std::env::args().nth(1) {
        Some(path) => plan.load_json(&std::fs::read_to_string(path)?)?,
        None => sample(&mut plan)?,
    }

    let size = plan.size();
    println!(
        "{} corners, {} walls, {} rooms ({:.0} x {:.0})",
        plan.corner_ids().len(),
        plan.wall_ids().len(),
        plan.room_ids().len(),
        size.x,
        size.y
    );
    for &room in plan.room_ids() {
        let data = plan.room(room)?;
        println!(
            "room {}: area {:.1}, floor {}",
            plan.room_uid(room)?,
            data.floor_area(),
            plan.room_floor_texture(room)?.url
        );
        for p in &data.interior_corners {
            println!("  ({:.1}, {:.1})", p.x, p.y);
        }
    }
    for plane in plan.wall_edge_planes()? {
        println!(
            "face ({:.1}, {:.1}) -> ({:.1}, {:.1}) h={}",
            plane.start.x, plane.start.y, plane.end.x, plane.end.y, plane.height
        );
    }
    Ok(())
}

/// Two rooms side by side plus a free-standing wall.
fn sample(plan: &mut Floorplan) -> floorgraph::Result<()> {
    let a = plan.new_corner(0.0, 0.0);
    let b = plan.new_corner(400.0, 0.0);
    let c = plan.new_corner(800.0, 0.0);
    let d = plan.new_corner(800.0, 400.0);
    let e = plan.new_corner(400.0, 400.0);
    let f = plan.new_corner(0.0, 400.0);
    for (start, end) in [(a, b), (b, c), (c, d), (d, e), (e, f), (f, a), (b, e)] {
        plan.new_wall(start, end)?;
    }
    let g = plan.new_corner(1000.0, 0.0);
    let h = plan.new_corner(1000.0, 300.0);
    plan.new_wall(g, h)?;
    Ok(())
}

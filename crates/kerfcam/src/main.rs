use anyhow::{Context, Result};
use kerfcam::*;
use kurbo::{CubicBez, Line, Point};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let operation = args.get(1).map(|s| s.as_str()).unwrap_or("offset");

    match operation {
        "graph" => demo_graph(),
        "parts" => demo_parts()?,
        "offset" => demo_offset(),
        _ => {
            println!("Usage: kerfcam [graph|parts|offset]");
            println!("  graph   - Reassemble a shape soup into chains");
            println!("  parts   - Build the shell/holes tree for nested cuts");
            println!("  offset  - Kerf-offset a cubic curve (default)");
        }
    }
    Ok(())
}

fn demo_graph() {
    println!("kerfcam - connectivity grapher");
    println!("==============================\n");

    // A scrambled triangle plus an isolated segment, as a parser would
    // hand them over: no ordering, no orientation.
    let shapes = vec![
        seg(10.0, 0.0, 5.0, 8.0),
        seg(0.0, 0.0, 10.0, 0.0),
        seg(0.0, 0.0, 5.0, 8.0),
        seg(20.0, 20.0, 30.0, 20.0),
    ];

    let chains = graph_shapes(shapes, DEFAULT_TOLERANCE);
    println!("{} chains:", chains.len());
    for (index, chain) in chains.iter().enumerate() {
        println!(
            "  #{index}: {} shape(s), closed: {}, start: {:?}",
            chain.len(),
            chain.is_closed(),
            chain.start_point()
        );
    }
}

fn demo_parts() -> Result<()> {
    println!("kerfcam - part hierarchy");
    println!("========================\n");

    let cuts = vec![
        square(0.0, 0.0, 50.0),
        square(10.0, 10.0, 8.0),
        square(30.0, 10.0, 8.0),
        square(70.0, 0.0, 20.0),
    ];

    let parts = build_parts(cuts).context("building the part hierarchy")?;
    println!("{} part(s):", parts.len());
    for (index, part) in parts.iter().enumerate() {
        println!(
            "  part {index}: shell of {} shape(s), {} hole(s)",
            part.shell.len(),
            part.holes.len()
        );
    }

    // The renderer consumes this exact structure.
    let json = serde_json::to_string_pretty(&parts).context("serializing parts")?;
    println!("\nas JSON:\n{json}");
    Ok(())
}

fn demo_offset() {
    println!("kerfcam - curve offset");
    println!("======================\n");

    let curve = CubicBez::new(
        Point::new(1.0, 10.0),
        Point::new(3.0, 5.0),
        Point::new(7.0, 5.0),
        Point::new(10.0, 10.0),
    );

    let offset = offset_cubic_curve(&curve, 10.0, 1.0);
    println!("{} offset shape(s):", offset.len());
    for (index, shape) in offset.iter().enumerate() {
        match shape {
            Shape::CubicCurve(c) => {
                println!("  #{index}: cubic {:?} -> {:?}", c.p0, c.p3);
            }
            Shape::Arc(arc) => {
                println!(
                    "  #{index}: arc around {:?}, radius {:.3}, {:?}",
                    arc.center,
                    arc.radius,
                    arc.direction()
                );
            }
            other => println!("  #{index}: {other:?}"),
        }
    }
}

fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
    Shape::Segment(Line::new(Point::new(x0, y0), Point::new(x1, y1)))
}

fn square(x: f64, y: f64, size: f64) -> Chain {
    Chain::with_default_tolerance(vec![
        seg(x, y, x + size, y),
        seg(x + size, y, x + size, y + size),
        seg(x + size, y + size, x, y + size),
        seg(x, y + size, x, y),
    ])
}

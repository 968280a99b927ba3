//! End-to-end flow: shape soup -> chains -> parts -> kerf compensation.

use kerfcam::*;
use kurbo::{Line, Point};

fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
    Shape::Segment(Line::new(Point::new(x0, y0), Point::new(x1, y1)))
}

#[test]
fn test_soup_to_compensated_part() {
    // Two nested squares, delivered scrambled and partly reversed, the way
    // a drawing parser hands them over.
    let soup = vec![
        seg(100.0, 0.0, 100.0, 100.0),
        seg(40.0, 60.0, 40.0, 40.0),
        seg(0.0, 0.0, 100.0, 0.0),
        seg(100.0, 100.0, 0.0, 100.0),
        seg(60.0, 40.0, 40.0, 40.0),
        seg(0.0, 0.0, 0.0, 100.0),
        seg(60.0, 60.0, 40.0, 60.0),
        seg(60.0, 40.0, 60.0, 60.0),
    ];

    let chains = graph_shapes(soup, DEFAULT_TOLERANCE);
    assert_eq!(chains.len(), 2);
    for chain in &chains {
        assert!(chain.is_closed(), "both contours must close");
    }

    let parts = build_parts(chains).expect("supported geometry");
    assert_eq!(parts.len(), 1);
    let part = &parts[0];
    assert_eq!(part.holes.len(), 1);

    // Every cut exposes a start point for the rapid-ordering step.
    assert!(part.shell.start_point().is_some());
    assert!(part.holes[0].start_point().is_some());

    // Kerf compensation: the shell grows, the hole shrinks.
    let kerf = 2.0;
    let shell_cut = kerf_compensated_chain(&part.shell, CutSide::Outside, kerf, 0.1);
    let hole_cut = kerf_compensated_chain(&part.holes[0], CutSide::Inside, kerf, 0.1);
    assert_eq!(shell_cut.len(), 4);
    assert_eq!(hole_cut.len(), 4);

    let shell_box = shell_cut.boundary().expect("non-empty");
    let original_box = part.shell.boundary().expect("non-empty");
    assert!(shell_box.width() > original_box.width());

    let hole_box = hole_cut.boundary().expect("non-empty");
    let original_hole_box = part.holes[0].boundary().expect("non-empty");
    assert!(hole_box.width() < original_hole_box.width());
}

#[test]
fn test_direction_is_settable_before_rendering() {
    let soup = vec![
        seg(0.0, 0.0, 10.0, 0.0),
        seg(10.0, 0.0, 10.0, 10.0),
        seg(10.0, 10.0, 0.0, 10.0),
        seg(0.0, 10.0, 0.0, 0.0),
    ];
    let mut chains = graph_shapes(soup, DEFAULT_TOLERANCE);
    assert_eq!(chains.len(), 1);
    let chain = &mut chains[0];

    chain.set_direction(Direction::Clockwise);
    assert_eq!(chain.direction(), Direction::Clockwise);
    assert!(chain.is_closed());

    chain.set_direction(Direction::CounterClockwise);
    assert_eq!(chain.direction(), Direction::CounterClockwise);
    assert!(chain.is_closed());
}

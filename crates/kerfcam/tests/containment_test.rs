use kerfcam::*;
use kurbo::{Circle, CubicBez, Line, Point};

fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
    Shape::Segment(Line::new(Point::new(x0, y0), Point::new(x1, y1)))
}

fn square_chain(x: f64, y: f64, size: f64) -> Chain {
    Chain::with_default_tolerance(vec![
        seg(x, y, x + size, y),
        seg(x + size, y, x + size, y + size),
        seg(x + size, y + size, x, y + size),
        seg(x, y + size, x, y),
    ])
}

#[test]
fn test_containment_is_asymmetric() {
    let outer = square_chain(0.0, 0.0, 100.0);
    let inner = square_chain(30.0, 30.0, 20.0);
    assert!(chain_contains(&outer, &inner).expect("supported geometry"));
    assert!(!chain_contains(&inner, &outer).expect("supported geometry"));
}

#[test]
fn test_identical_chains_have_no_interior_between_them() {
    let a = square_chain(0.0, 0.0, 50.0);
    let b = square_chain(0.0, 0.0, 50.0);
    assert!(!chain_contains(&a, &b).expect("supported geometry"));
    assert!(!chain_contains(&b, &a).expect("supported geometry"));
}

#[test]
fn test_shared_edge_rejects_containment() {
    let left = square_chain(0.0, 0.0, 10.0);
    let right = square_chain(10.0, 0.0, 10.0);
    assert!(!chain_contains(&left, &right).expect("supported geometry"));
    assert!(!chain_contains(&right, &left).expect("supported geometry"));
}

#[test]
fn test_crossing_contours_reject_containment() {
    let square = square_chain(0.0, 0.0, 10.0);
    let crossing = Chain::with_default_tolerance(vec![seg(-5.0, 5.0, 15.0, 5.0)]);
    assert!(!chain_contains(&square, &crossing).expect("supported geometry"));
}

#[test]
fn test_disjoint_contours_reject_containment() {
    let a = square_chain(0.0, 0.0, 10.0);
    let b = square_chain(50.0, 50.0, 10.0);
    assert!(!chain_contains(&a, &b).expect("supported geometry"));
}

#[test]
fn test_curved_shell_contains_square() {
    let shell = Chain::with_default_tolerance(vec![Shape::Circle(Circle::new(
        Point::new(0.0, 0.0),
        50.0,
    ))]);
    let inner = square_chain(-10.0, -10.0, 20.0);
    assert!(chain_contains(&shell, &inner).expect("supported geometry"));
    assert!(!chain_contains(&inner, &shell).expect("supported geometry"));
}

#[test]
fn test_open_inner_contour_is_supported() {
    let outer = square_chain(0.0, 0.0, 100.0);
    let open = Chain::with_default_tolerance(vec![Shape::CubicCurve(CubicBez::new(
        Point::new(20.0, 20.0),
        Point::new(40.0, 60.0),
        Point::new(60.0, 60.0),
        Point::new(80.0, 20.0),
    ))]);
    assert!(chain_contains(&outer, &open).expect("supported geometry"));
}

#[test]
fn test_non_finite_shape_raises_unsupported_geometry() {
    let outer = square_chain(0.0, 0.0, 100.0);
    let bad = Chain::with_default_tolerance(vec![seg(f64::INFINITY, 0.0, 1.0, 0.0)]);
    match chain_contains(&outer, &bad) {
        Err(GeometryError::UnsupportedGeometry(message)) => {
            assert!(message.contains("segment"), "message: {message}");
        }
        other => panic!("expected unsupported geometry, got {other:?}"),
    }
}

use kurbo::{Point, Vec2};

use crate::chain::Chain;
use crate::error::{GeometryError, Result};
use crate::geometry::Shape;

/// Samples per curved shape when flattening a chain to a polyline.
const CURVE_SAMPLES: usize = 100;

/// Only every n-th inner point runs through the point-in-polygon test.
///
/// A contour that survives the intersection test is almost always entirely
/// inside or entirely outside, so probing a fifth of its points is enough
/// in practice. Pathological inputs can slip through as false negatives;
/// that trade-off is intentional and pinned by tests.
const POINT_SAMPLE_STRIDE: usize = 5;

const EDGE_EPSILON: f64 = 1e-9;

/// Whether `outer` fully encloses `inner`.
///
/// Both chains are flattened to polylines; the outer polyline is closed if
/// needed. Containment is rejected as soon as any inner segment crosses any
/// outer segment (touching counts as crossing), then confirmed only when
/// every sampled inner point ray-casts to the inside of the outer polygon.
/// Points exactly on an outer edge count as outside, so two identical
/// chains do not contain each other.
///
/// `outer` must be closed for the result to be meaningful; an open `inner`
/// is supported.
pub fn chain_contains(outer: &Chain, inner: &Chain) -> Result<bool> {
    let mut outer_points = flatten_chain(outer)?;
    let inner_points = flatten_chain(inner)?;
    if outer_points.len() < 2 || inner_points.is_empty() {
        return Ok(false);
    }

    if outer_points[0] != outer_points[outer_points.len() - 1] {
        outer_points.push(outer_points[0]);
    }

    for inner_edge in inner_points.windows(2) {
        for outer_edge in outer_points.windows(2) {
            if segments_intersect(inner_edge[0], inner_edge[1], outer_edge[0], outer_edge[1]) {
                return Ok(false);
            }
        }
    }

    for index in (0..inner_points.len()).step_by(POINT_SAMPLE_STRIDE) {
        if !point_in_polygon(inner_points[index], &outer_points) {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Flatten a chain into an ordered polyline.
///
/// Segments contribute their two endpoints; arcs, circles and Bézier
/// curves contribute evenly-parameterized samples from their own
/// point-at-parameter formulas. Consecutive duplicate points (shared shape
/// endpoints) are dropped.
pub(crate) fn flatten_chain(chain: &Chain) -> Result<Vec<Point>> {
    let mut points: Vec<Point> = Vec::new();
    for shape in &chain.shapes {
        let sampled = match shape {
            Shape::Segment(line) => vec![line.p0, line.p1],
            Shape::Arc(_) | Shape::Circle(_) | Shape::QuadraticCurve(_) | Shape::CubicCurve(_) => {
                shape.sample_points(CURVE_SAMPLES)
            }
        };
        for point in sampled {
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(GeometryError::UnsupportedGeometry(format!(
                    "{} produced a non-finite sample point",
                    shape.variant_name()
                )));
            }
            let duplicate = points
                .last()
                .map(|last| (last.x - point.x).abs() <= EDGE_EPSILON
                    && (last.y - point.y).abs() <= EDGE_EPSILON)
                .unwrap_or(false);
            if !duplicate {
                points.push(point);
            }
        }
    }
    Ok(points)
}

/// Segment intersection via orientation sign tests.
///
/// Collinear overlap counts as intersecting: contours that share an edge
/// can never be nested.
fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    let straddles_ab = (o1 > EDGE_EPSILON && o2 < -EDGE_EPSILON)
        || (o1 < -EDGE_EPSILON && o2 > EDGE_EPSILON);
    let straddles_cd = (o3 > EDGE_EPSILON && o4 < -EDGE_EPSILON)
        || (o3 < -EDGE_EPSILON && o4 > EDGE_EPSILON);
    if straddles_ab && straddles_cd {
        return true;
    }

    (o1.abs() <= EDGE_EPSILON && point_on_segment(c, a, b))
        || (o2.abs() <= EDGE_EPSILON && point_on_segment(d, a, b))
        || (o3.abs() <= EDGE_EPSILON && point_on_segment(a, c, d))
        || (o4.abs() <= EDGE_EPSILON && point_on_segment(b, c, d))
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

fn point_on_segment(p: Point, a: Point, b: Point) -> bool {
    let ab: Vec2 = b - a;
    let ap: Vec2 = p - a;
    if ab.cross(ap).abs() > EDGE_EPSILON {
        return false;
    }
    let along = ap.dot(ab);
    along >= -EDGE_EPSILON && along <= ab.hypot2() + EDGE_EPSILON
}

/// Even-odd ray casting, with points exactly on an edge counted as outside.
fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    for edge in polygon.windows(2) {
        if point_on_segment(point, edge[0], edge[1]) {
            return false;
        }
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];
        let crosses = (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DEFAULT_TOLERANCE;
    use kurbo::Line;

    fn square_chain(x: f64, y: f64, size: f64) -> Chain {
        Chain::new(
            vec![
                Shape::Segment(Line::new(Point::new(x, y), Point::new(x + size, y))),
                Shape::Segment(Line::new(
                    Point::new(x + size, y),
                    Point::new(x + size, y + size),
                )),
                Shape::Segment(Line::new(
                    Point::new(x + size, y + size),
                    Point::new(x, y + size),
                )),
                Shape::Segment(Line::new(Point::new(x, y + size), Point::new(x, y))),
            ],
            DEFAULT_TOLERANCE,
        )
    }

    #[test]
    fn test_nested_squares_contain_one_way() {
        let outer = square_chain(0.0, 0.0, 10.0);
        let inner = square_chain(4.0, 4.0, 2.0);
        assert!(chain_contains(&outer, &inner).expect("flatten"));
        assert!(!chain_contains(&inner, &outer).expect("flatten"));
    }

    #[test]
    fn test_identical_chains_do_not_contain() {
        let a = square_chain(0.0, 0.0, 10.0);
        let b = square_chain(0.0, 0.0, 10.0);
        assert!(!chain_contains(&a, &b).expect("flatten"));
    }

    #[test]
    fn test_touching_squares_do_not_contain() {
        let left = square_chain(0.0, 0.0, 10.0);
        let right = square_chain(10.0, 0.0, 10.0);
        assert!(!chain_contains(&left, &right).expect("flatten"));
    }

    #[test]
    fn test_crossing_line_is_not_contained() {
        let outer = square_chain(0.0, 0.0, 10.0);
        let diagonal = Chain::new(
            vec![Shape::Segment(Line::new(
                Point::new(5.0, 5.0),
                Point::new(15.0, 15.0),
            ))],
            DEFAULT_TOLERANCE,
        );
        assert!(!chain_contains(&outer, &diagonal).expect("flatten"));
    }

    #[test]
    fn test_open_inner_chain_is_supported() {
        let outer = square_chain(0.0, 0.0, 10.0);
        let open = Chain::new(
            vec![
                Shape::Segment(Line::new(Point::new(2.0, 2.0), Point::new(6.0, 2.0))),
                Shape::Segment(Line::new(Point::new(6.0, 2.0), Point::new(6.0, 6.0))),
            ],
            DEFAULT_TOLERANCE,
        );
        assert!(chain_contains(&outer, &open).expect("flatten"));
    }

    #[test]
    fn test_point_on_edge_counts_as_outside() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 0.0),
        ];
        assert!(!point_in_polygon(Point::new(5.0, 0.0), &square));
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(11.0, 5.0), &square));
    }

    #[test]
    fn test_collinear_overlap_intersects() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(8.0, 0.0),
        ));
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(6.0, 0.0),
            Point::new(8.0, 0.0),
        ));
    }

    #[test]
    fn test_curved_inner_chain_against_circle() {
        let outer = Chain::new(
            vec![Shape::Circle(kurbo::Circle::new(Point::new(0.0, 0.0), 10.0))],
            DEFAULT_TOLERANCE,
        );
        let inner = square_chain(-2.0, -2.0, 4.0);
        assert!(chain_contains(&outer, &inner).expect("flatten"));
        assert!(!chain_contains(&inner, &outer).expect("flatten"));
    }

    #[test]
    fn test_non_finite_geometry_is_rejected() {
        let bad = Chain::new(
            vec![Shape::Segment(Line::new(
                Point::new(f64::NAN, 0.0),
                Point::new(1.0, 0.0),
            ))],
            DEFAULT_TOLERANCE,
        );
        let good = square_chain(0.0, 0.0, 10.0);
        match chain_contains(&good, &bad) {
            Err(GeometryError::UnsupportedGeometry(_)) => {}
            other => panic!("expected unsupported geometry, got {other:?}"),
        }
    }
}

//! Parametric offset engine for cubic Bézier curves.
//!
//! Computes kerf-compensated parallel curves. A signed `distance` offsets
//! toward the left of the traversal (positive) or the right (negative);
//! closed contours therefore need one run per side. The result approximates
//! the true parallel curve within `maximum_error` at the validation probes.

use kurbo::{CubicBez, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, Point, QuadBez, Vec2};
use log::debug;
use std::f64::consts::PI;

use crate::geometry::{Arc, Direction, Shape};

mod roots;

/// Bounding boxes smaller than this are point-like; offsetting them is a
/// no-op.
const DEGENERATE_EXTENT: f64 = 1e-9;

/// Strict collinearity bound for the completely-straight classification,
/// in normalized (unit-scale) coordinates.
const COLLINEAR_EPSILON: f64 = 1e-9;

/// Looser tangent-collinearity bound for the approximately-straight
/// classification.
const NEAR_COLLINEAR_EPSILON: f64 = 5e-3;

/// Chords shorter than this cannot anchor the straight classifications.
const CHORD_EPSILON: f64 = 1e-6;

/// Sub-curves with a control polygon shorter than this are accepted
/// trivially, which bounds the bisection depth.
const MIN_PERIMETER: f64 = 1e-4;

/// Derivative magnitudes below this mark a cusp.
const CUSP_SPEED_EPSILON: f64 = 1e-3;

/// Iteration cap for the binary search that walks a split point off a
/// cusp.
const CUSP_SEARCH_ITERATIONS: usize = 18;

/// Subdivision parameters closer than this to an endpoint are ignored.
const SPLIT_MARGIN: f64 = 1e-4;

/// Interior parameters where an arc candidate is validated.
const ARC_PROBES: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

/// Parameters where a simple-offset candidate is validated.
const OFFSET_PROBES: [f64; 3] = [0.25, 0.5, 0.85];

/// Offset a cubic Bézier curve by a signed distance.
///
/// Returns an ordered run of cubic curves and arcs forming one continuous
/// parallel path. A degenerate (point-like) input yields an empty result
/// instead of an error: it contributes nothing to the visible path.
pub fn offset_cubic_curve(curve: &CubicBez, distance: f64, maximum_error: f64) -> Vec<Shape> {
    let bbox = curve.bounding_box();
    let extent = bbox.width().max(bbox.height());
    if !extent.is_finite() || extent < DEGENERATE_EXTENT {
        return Vec::new();
    }

    // Work in a unit-scale frame centered on the curve so every threshold
    // below is size-independent; undo the transform on the way out.
    let center = bbox.center().to_vec2();
    let scale = 2.0 / extent;
    let normalize = |p: Point| ((p.to_vec2() - center) * scale).to_point();
    let local = CubicBez::new(
        normalize(curve.p0),
        normalize(curve.p1),
        normalize(curve.p2),
        normalize(curve.p3),
    );

    offset_unit_curve(&local, distance * scale, maximum_error * scale)
        .into_iter()
        .map(|shape| denormalized(shape, scale, center))
        .collect()
}

fn offset_unit_curve(curve: &CubicBez, distance: f64, maximum_error: f64) -> Vec<Shape> {
    let chord = curve.p3 - curve.p0;
    let chord_len = chord.hypot();
    if chord_len > CHORD_EPSILON {
        let turn1 = (curve.p1 - curve.p0).cross(chord);
        let turn2 = (curve.p2 - curve.p0).cross(chord);
        if turn1.abs() <= COLLINEAR_EPSILON && turn2.abs() <= COLLINEAR_EPSILON {
            return offset_collinear(curve, distance);
        }

        if let (Some(start), Some(end)) = (start_tangent(curve), end_tangent(curve)) {
            let axis = chord / chord_len;
            let nearly_straight = start.cross(end).abs() <= NEAR_COLLINEAR_EPSILON
                && start.cross(axis).abs() <= NEAR_COLLINEAR_EPSILON
                && start.dot(axis) > 0.0
                && end.dot(axis) > 0.0;
            if nearly_straight {
                // Offset the two tangent lines along their own normals and
                // span them with a single cubic.
                let n0 = left_normal(start) * distance;
                let n1 = left_normal(end) * distance;
                return vec![Shape::CubicCurve(CubicBez::new(
                    curve.p0 + n0,
                    curve.p1 + n0,
                    curve.p2 + n1,
                    curve.p3 + n1,
                ))];
            }
        }
    }
    offset_general(curve, distance, maximum_error)
}

/// Offset of a fully collinear curve.
///
/// Without a parameter reversal this is the input translated along its
/// unit normal. With reversals (a cusp on the line), each monotone run
/// translates along its own side of the line and a semicircular arc
/// bridges the offset across every cusp.
fn offset_collinear(curve: &CubicBez, distance: f64) -> Vec<Shape> {
    let chord = curve.p3 - curve.p0;
    let axis = chord / chord.hypot();
    let normal = left_normal(axis);

    let (d0, d1, d2) = derivative_coefficients(curve);
    let speed = |t: f64| (d0 + d1 * t + d2 * (t * t)).dot(axis);
    let reversals: Vec<f64> =
        roots::clamp_to_unit(roots::solve_quadratic(d2.dot(axis), d1.dot(axis), d0.dot(axis)))
            .into_iter()
            .filter(|&t| t > SPLIT_MARGIN && t < 1.0 - SPLIT_MARGIN)
            .filter(|&t| speed(t - 1e-4) * speed(t + 1e-4) < 0.0)
            .collect();

    if reversals.is_empty() {
        return vec![Shape::CubicCurve(translated_cubic(curve, normal * distance))];
    }

    let mut params = Vec::with_capacity(reversals.len() + 2);
    params.push(0.0);
    params.extend(reversals.iter().copied());
    params.push(1.0);

    let mut result = Vec::new();
    for i in 0..params.len() - 1 {
        let (from, to) = (params[i], params[i + 1]);
        let piece = curve.subsegment(from..to);
        let side = if speed(0.5 * (from + to)) >= 0.0 { 1.0 } else { -1.0 };
        let piece_normal = normal * side;
        result.push(Shape::CubicCurve(translated_cubic(&piece, piece_normal * distance)));
        if i + 2 < params.len() {
            // Semicircle around the reversal tip, wound so the bridge
            // wraps the tip instead of cutting back across the line.
            let tip = curve.eval(to);
            let start_angle = (piece_normal * distance).atan2();
            let winding = if side * distance > 0.0 {
                Direction::Clockwise
            } else {
                Direction::CounterClockwise
            };
            result.push(Shape::Arc(Arc::with_direction(
                tip,
                distance.abs(),
                start_angle,
                start_angle + PI,
                winding,
            )));
        }
    }
    result
}

fn offset_general(curve: &CubicBez, distance: f64, maximum_error: f64) -> Vec<Shape> {
    // Near-circular curves are common (corner rounding); a validated arc
    // fit short-circuits the whole subdivision analysis.
    if let Some(arc) = arc_approximation(curve, distance, maximum_error) {
        return vec![arc];
    }

    let splits = subdivision_parameters(curve);
    let deriv = curve.deriv();

    // Piece list with cusp-aware boundaries: a split whose derivative has
    // collapsed gets walked off the singularity on both sides, and the
    // offset is bridged across it with an arc.
    let mut pieces: Vec<(f64, f64, Option<f64>)> = Vec::new();
    let mut cursor = 0.0;
    for (i, &t) in splits.iter().enumerate() {
        let speed = deriv.eval(t).to_vec2().hypot();
        if speed < CUSP_SPEED_EPSILON {
            let upper = splits.get(i + 1).copied().unwrap_or(1.0);
            let before = escape_cusp(&deriv, t, cursor);
            let after = escape_cusp(&deriv, t, upper);
            pieces.push((cursor, before, Some(t)));
            cursor = after;
        } else {
            pieces.push((cursor, t, None));
            cursor = t;
        }
    }
    pieces.push((cursor, 1.0, None));

    let mut result = Vec::new();
    for (i, &(from, to, cusp)) in pieces.iter().enumerate() {
        if to - from > SPLIT_MARGIN {
            let piece = curve.subsegment(from..to);
            result.extend(offset_piece(&piece, distance, maximum_error));
        }
        if let Some(cusp_param) = cusp {
            if let Some(&(next_from, _, _)) = pieces.get(i + 1) {
                let before = offset_point(curve, to, distance);
                let after = offset_point(curve, next_from, distance);
                if let (Some(prev_end), Some(next_start)) = (before, after) {
                    let cusp_point = curve.eval(cusp_param);
                    if let Some(arc) = bridge_arc(prev_end, cusp_point, next_start, distance.abs())
                    {
                        result.push(Shape::Arc(arc));
                    }
                }
            }
        }
    }
    result
}

/// Offset one subdivided piece: simple offset, then arc fit, then bisect.
fn offset_piece(piece: &CubicBez, distance: f64, maximum_error: f64) -> Vec<Shape> {
    if control_perimeter(piece) < MIN_PERIMETER {
        // Vanishing sliver; translating it is within any sensible error
        // bound and guarantees the recursion terminates.
        return match start_tangent(piece) {
            Some(tangent) => vec![Shape::CubicCurve(translated_cubic(
                piece,
                left_normal(tangent) * distance,
            ))],
            None => Vec::new(),
        };
    }
    if let Some(candidate) = simple_offset(piece, distance, maximum_error) {
        return vec![Shape::CubicCurve(candidate)];
    }
    if let Some(arc) = arc_approximation(piece, distance, maximum_error) {
        return vec![arc];
    }
    debug!("bisecting offset piece: simple and arc fits both exceeded the error bound");
    let mut result = offset_piece(&piece.subsegment(0.0..0.5), distance, maximum_error);
    result.extend(offset_piece(&piece.subsegment(0.5..1.0), distance, maximum_error));
    result
}

/// Fit a circular arc to the offset of `piece`.
///
/// The candidate center is the intersection of the endpoint normals and
/// the radius blends the two endpoint distances; the fit is accepted when
/// the curve itself stays within `maximum_error` of the candidate circle
/// at four interior parameters. Offsetting then only shifts the radius.
/// An offset past the center (|distance| exceeding the radius) reflects
/// the arc through it rather than failing.
fn arc_approximation(piece: &CubicBez, distance: f64, maximum_error: f64) -> Option<Shape> {
    let start = start_tangent(piece)?;
    let end = end_tangent(piece)?;
    let n0 = left_normal(start);
    let n1 = left_normal(end);
    let denom = n0.cross(n1);
    if denom.abs() < 1e-9 {
        return None;
    }
    let chord = piece.p3 - piece.p0;
    let along = chord.cross(n1) / denom;
    let center = piece.p0 + n0 * along;
    let radius = 0.5 * ((piece.p0 - center).hypot() + (piece.p3 - center).hypot());
    if !radius.is_finite() || radius < 1e-9 {
        return None;
    }
    for &t in ARC_PROBES.iter() {
        if ((piece.eval(t) - center).hypot() - radius).abs() > maximum_error {
            return None;
        }
    }

    // A positive distance moves toward the center when the center sits on
    // the left of the traversal.
    let toward_center = if start.cross(center - piece.p0) > 0.0 {
        distance
    } else {
        -distance
    };
    let offset_radius = radius - toward_center;
    if offset_radius.abs() < 1e-9 {
        return None;
    }
    let mut start_angle = (piece.p0 - center).atan2();
    let mut end_angle = (piece.p3 - center).atan2();
    if offset_radius < 0.0 {
        start_angle += PI;
        end_angle += PI;
    }
    let winding = if (piece.p0 - center).cross(start) > 0.0 {
        Direction::CounterClockwise
    } else {
        Direction::Clockwise
    };
    Some(Shape::Arc(Arc::with_direction(
        center,
        offset_radius.abs(),
        start_angle,
        end_angle,
        winding,
    )))
}

/// Closed-form offset candidate for one piece.
///
/// The candidate keeps the endpoint tangent directions; the two free
/// control-point distances come from a 2×2 linear solve pinning the
/// candidate midpoint to the offset midpoint. Validation casts a ray from
/// the source curve along its normal at each probe and requires the hit
/// distance to match the offset within `maximum_error`.
fn simple_offset(piece: &CubicBez, distance: f64, maximum_error: f64) -> Option<CubicBez> {
    let start = start_tangent(piece)?;
    let end = end_tangent(piece)?;
    let q0 = piece.p0 + left_normal(start) * distance;
    let q3 = piece.p3 + left_normal(end) * distance;
    let mid = offset_point(piece, 0.5, distance)?;

    // candidate(0.5) = (q0 + q3)/2 + 3/8 (alpha·start − beta·end)
    let rhs = (mid - q0.midpoint(q3)) * (8.0 / 3.0);
    let det = start.x * (-end.y) - (-end.x) * start.y;
    if det.abs() < 1e-9 {
        return None;
    }
    let alpha = (rhs.x * (-end.y) - (-end.x) * rhs.y) / det;
    let beta = (start.x * rhs.y - rhs.x * start.y) / det;
    if !alpha.is_finite() || !beta.is_finite() || alpha <= 0.0 || beta <= 0.0 {
        return None;
    }
    let candidate = CubicBez::new(q0, q0 + start * alpha, q3 - end * beta, q3);

    for &probe in OFFSET_PROBES.iter() {
        let origin = piece.eval(probe);
        let normal = left_normal(unit_tangent(piece, probe)?);
        let error = ray_probe_error(&candidate, origin, normal, distance)?;
        if error > maximum_error {
            return None;
        }
    }
    Some(candidate)
}

/// Distance error of the candidate along a probe ray.
///
/// Intersects the ray `origin + s·normal` with the candidate curve by
/// solving the cubic `cross(candidate(u) − origin, normal) = 0`, then
/// reports how far the closest hit deviates from the requested offset.
/// `None` when the ray misses the candidate entirely.
fn ray_probe_error(candidate: &CubicBez, origin: Point, normal: Vec2, distance: f64) -> Option<f64> {
    let q0 = candidate.p0.to_vec2();
    let q1 = candidate.p1.to_vec2();
    let q2 = candidate.p2.to_vec2();
    let q3 = candidate.p3.to_vec2();
    let c0 = q0 - origin.to_vec2();
    let c1 = (q1 - q0) * 3.0;
    let c2 = (q2 - q1 * 2.0 + q0) * 3.0;
    let c3 = q3 - q2 * 3.0 + q1 * 3.0 - q0;

    let hits = roots::clamp_to_unit(roots::solve_cubic(
        c3.cross(normal),
        c2.cross(normal),
        c1.cross(normal),
        c0.cross(normal),
    ));
    let mut best: Option<f64> = None;
    for u in hits {
        let along = (c0 + c1 * u + c2 * (u * u) + c3 * (u * u * u)).dot(normal);
        let error = (along - distance).abs();
        if best.map(|b| error < b).unwrap_or(true) {
            best = Some(error);
        }
    }
    best
}

/// Parameters worth subdividing at: derivative-magnitude extrema (up to
/// three, where curvature spikes and cusps land) and inflections (up to
/// two), merged, clamped to the unit interval and deduplicated.
fn subdivision_parameters(curve: &CubicBez) -> Vec<f64> {
    let (d0, d1, d2) = derivative_coefficients(curve);

    // d/dt |B'(t)|² is cubic in t.
    let mut params = roots::solve_cubic(
        2.0 * d2.hypot2(),
        3.0 * d1.dot(d2),
        2.0 * d0.dot(d2) + d1.hypot2(),
        d0.dot(d1),
    );

    // Inflections: cross(B'(t), B''(t)) = 0 is quadratic in t.
    let a1 = curve.p1 - curve.p0;
    let v1 = (curve.p2 - curve.p1) - (curve.p1 - curve.p0);
    let v2 = (curve.p3 - curve.p2) - (curve.p2 - curve.p1) * 2.0 + (curve.p1 - curve.p0);
    params.extend(roots::solve_quadratic(v1.cross(v2), a1.cross(v2), a1.cross(v1)));

    roots::clamp_to_unit(params)
        .into_iter()
        .filter(|&t| t > SPLIT_MARGIN && t < 1.0 - SPLIT_MARGIN)
        .collect()
}

/// Power-basis coefficients of the derivative: B'(t) = d0 + d1·t + d2·t².
fn derivative_coefficients(curve: &CubicBez) -> (Vec2, Vec2, Vec2) {
    let p0 = curve.p0.to_vec2();
    let p1 = curve.p1.to_vec2();
    let p2 = curve.p2.to_vec2();
    let p3 = curve.p3.to_vec2();
    (
        (p1 - p0) * 3.0,
        (p2 - p1 * 2.0 + p0) * 6.0,
        (p3 - p2 * 3.0 + p1 * 3.0 - p0) * 3.0,
    )
}

/// Walk a split point away from a cusp until the derivative recovers.
///
/// Binary search between the cusp parameter and `toward`, capped at a
/// fixed iteration count so termination never depends on the data.
fn escape_cusp(deriv: &QuadBez, cusp: f64, toward: f64) -> f64 {
    let mut lo = cusp;
    let mut hi = toward;
    for _ in 0..CUSP_SEARCH_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if deriv.eval(mid).to_vec2().hypot() < CUSP_SPEED_EPSILON {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    hi
}

/// Arc bridging the offset across a cusp, centered on the cusp itself and
/// wound by the orientation of the (end, cusp, start) triangle so the
/// bridge does not invert the path.
fn bridge_arc(prev_end: Point, cusp: Point, next_start: Point, radius: f64) -> Option<Arc> {
    if prev_end.distance(next_start) < 1e-9 || radius < 1e-9 {
        return None;
    }
    let start_angle = (prev_end - cusp).atan2();
    let end_angle = (next_start - cusp).atan2();
    let turn = (cusp - prev_end).cross(next_start - prev_end);
    let winding = if turn >= 0.0 {
        Direction::CounterClockwise
    } else {
        Direction::Clockwise
    };
    Some(Arc::with_direction(cusp, radius, start_angle, end_angle, winding))
}

fn offset_point(curve: &CubicBez, t: f64, distance: f64) -> Option<Point> {
    let tangent = unit_tangent(curve, t)?;
    Some(curve.eval(t) + left_normal(tangent) * distance)
}

fn unit_tangent(curve: &CubicBez, t: f64) -> Option<Vec2> {
    let v = curve.deriv().eval(t).to_vec2();
    let len = v.hypot();
    if len < 1e-12 {
        None
    } else {
        Some(v / len)
    }
}

/// Direction of the first non-degenerate control leg from the start.
fn start_tangent(curve: &CubicBez) -> Option<Vec2> {
    for control in [curve.p1, curve.p2, curve.p3] {
        let v = control - curve.p0;
        let len = v.hypot();
        if len > 1e-12 {
            return Some(v / len);
        }
    }
    None
}

/// Direction of the last non-degenerate control leg into the end.
fn end_tangent(curve: &CubicBez) -> Option<Vec2> {
    for control in [curve.p2, curve.p1, curve.p0] {
        let v = curve.p3 - control;
        let len = v.hypot();
        if len > 1e-12 {
            return Some(v / len);
        }
    }
    None
}

fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

fn control_perimeter(curve: &CubicBez) -> f64 {
    (curve.p1 - curve.p0).hypot() + (curve.p2 - curve.p1).hypot() + (curve.p3 - curve.p2).hypot()
}

fn translated_cubic(curve: &CubicBez, offset: Vec2) -> CubicBez {
    CubicBez::new(
        curve.p0 + offset,
        curve.p1 + offset,
        curve.p2 + offset,
        curve.p3 + offset,
    )
}

fn denormalized(shape: Shape, scale: f64, center: Vec2) -> Shape {
    let map = |p: Point| (p.to_vec2() / scale + center).to_point();
    match shape {
        Shape::CubicCurve(c) => {
            Shape::CubicCurve(CubicBez::new(map(c.p0), map(c.p1), map(c.p2), map(c.p3)))
        }
        Shape::Arc(a) => Shape::Arc(Arc::with_direction(
            map(a.center),
            a.radius / scale,
            a.start_angle,
            a.end_angle,
            a.direction(),
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_subdivision_parameters_on_symmetric_bow() {
        let curve = CubicBez::new(
            Point::new(1.0, 10.0),
            Point::new(3.0, 5.0),
            Point::new(7.0, 5.0),
            Point::new(10.0, 10.0),
        );
        let params = subdivision_parameters(&curve);
        // One speed minimum near the bottom of the bow, no inflections.
        assert_eq!(params.len(), 1);
        assert!(params[0] > 0.3 && params[0] < 0.7, "split at {}", params[0]);
    }

    #[test]
    fn test_arc_approximation_accepts_near_circle() {
        // Standard single-segment circle approximation of a quarter turn.
        let k = 5.522_847_498_307_936;
        let quarter = CubicBez::new(
            Point::new(10.0, 0.0),
            Point::new(10.0, k),
            Point::new(k, 10.0),
            Point::new(0.0, 10.0),
        );
        let shape = arc_approximation(&quarter, 2.0, 0.5).expect("near-circular fit");
        match shape {
            Shape::Arc(arc) => {
                assert_abs_diff_eq!(arc.center.x, 0.0, epsilon = 1e-6);
                assert_abs_diff_eq!(arc.center.y, 0.0, epsilon = 1e-6);
                // Center on the left of travel: positive offset shrinks.
                assert_abs_diff_eq!(arc.radius, 8.0, epsilon = 1e-6);
                assert_eq!(arc.direction(), Direction::CounterClockwise);
            }
            other => panic!("expected an arc, got {other:?}"),
        }
    }

    #[test]
    fn test_arc_approximation_rejects_flat_curve() {
        let flat = CubicBez::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
        );
        assert!(arc_approximation(&flat, 1.0, 0.1).is_none());
    }

    #[test]
    fn test_simple_offset_of_gentle_curve() {
        let gentle = CubicBez::new(
            Point::new(0.0, 0.0),
            Point::new(3.0, 2.0),
            Point::new(7.0, 2.0),
            Point::new(10.0, 0.0),
        );
        let candidate =
            simple_offset(&gentle, 0.5, 0.25).expect("gentle curve offsets in closed form");
        // Endpoints sit exactly one offset along the endpoint normals.
        let n0 = left_normal(start_tangent(&gentle).expect("tangent"));
        let expected = gentle.p0 + n0 * 0.5;
        assert_abs_diff_eq!(candidate.p0.x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(candidate.p0.y, expected.y, epsilon = 1e-9);
    }

    #[test]
    fn test_escape_cusp_moves_off_singularity() {
        // Crossed control polygon with the derivative collapsing at t = 0.5.
        let cusp_curve = CubicBez::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.0),
        );
        let deriv = cusp_curve.deriv();
        assert!(deriv.eval(0.5).to_vec2().hypot() < CUSP_SPEED_EPSILON);
        let escaped = escape_cusp(&deriv, 0.5, 0.0);
        assert!(deriv.eval(escaped).to_vec2().hypot() >= CUSP_SPEED_EPSILON);
        assert!(escaped < 0.5);
    }
}

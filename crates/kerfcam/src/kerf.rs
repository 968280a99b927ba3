//! Kerf compensation for whole contours.
//!
//! The torch beam removes half the kerf width on each side of its path, so
//! a contour must be offset by half the kerf before cutting: outward for a
//! part's outline, inward for a hole. Segments, arcs and circles offset
//! exactly; Bézier members run through the parametric offset engine.

use kurbo::{Line, Vec2};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::geometry::{Direction, Shape};
use crate::offset::offset_cubic_curve;

/// Which side of the drawn contour the torch should cut on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutSide {
    /// Keep the material inside the contour (shells).
    Outside,
    /// Keep the material outside the contour (holes).
    Inside,
}

/// Offset a contour by half the kerf width on the requested side.
///
/// The signed per-shape offset distance is derived from the chain's
/// winding, so the same `CutSide` means the same physical side regardless
/// of how the contour happens to be wound. Shapes whose offset collapses
/// (an arc or circle shrinking past its center) are skipped with a
/// warning; the rest of the contour still comes out machinable.
pub fn kerf_compensated_chain(
    chain: &Chain,
    cut_side: CutSide,
    kerf_width: f64,
    maximum_error: f64,
) -> Chain {
    let half = kerf_width / 2.0;
    // Traversal keeps the enclosed area on the left for counter-clockwise
    // contours, so a positive (leftward) offset moves inward.
    let inward = match chain.direction() {
        Direction::CounterClockwise => half,
        Direction::Clockwise => -half,
    };
    let distance = match cut_side {
        CutSide::Inside => inward,
        CutSide::Outside => -inward,
    };

    let mut shapes = Vec::with_capacity(chain.len());
    for shape in &chain.shapes {
        offset_shape(shape, distance, maximum_error, &mut shapes);
    }
    Chain::new(shapes, chain.tolerance)
}

fn offset_shape(shape: &Shape, distance: f64, maximum_error: f64, out: &mut Vec<Shape>) {
    match shape {
        Shape::Segment(line) => {
            let v = line.p1 - line.p0;
            let len = v.hypot();
            if len < 1e-12 {
                warn!("skipping zero-length segment during kerf compensation");
                return;
            }
            let normal = Vec2::new(-v.y, v.x) / len * distance;
            out.push(Shape::Segment(Line::new(line.p0 + normal, line.p1 + normal)));
        }
        Shape::Arc(arc) => {
            // The center sits on the left of a counter-clockwise traversal,
            // so a leftward offset shrinks the radius.
            let radius = match arc.direction() {
                Direction::CounterClockwise => arc.radius - distance,
                Direction::Clockwise => arc.radius + distance,
            };
            if radius <= 0.0 {
                warn!("skipping arc collapsed by kerf compensation (radius {:.4})", arc.radius);
                return;
            }
            let mut offset = *arc;
            offset.radius = radius;
            out.push(Shape::Arc(offset));
        }
        Shape::Circle(circle) => {
            let radius = circle.radius - distance;
            if radius <= 0.0 {
                warn!(
                    "skipping circle collapsed by kerf compensation (radius {:.4})",
                    circle.radius
                );
                return;
            }
            out.push(Shape::Circle(kurbo::Circle::new(circle.center, radius)));
        }
        Shape::QuadraticCurve(quad) => {
            out.extend(offset_cubic_curve(&quad.raise(), distance, maximum_error));
        }
        Shape::CubicCurve(cubic) => {
            out.extend(offset_cubic_curve(cubic, distance, maximum_error));
        }
    }
}

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::geometry::{points_coincide, Direction, Shape, DEFAULT_TOLERANCE};

/// Samples per curved shape when estimating a chain's signed area.
const AREA_SAMPLES: usize = 100;

/// An ordered sequence of shapes forming one contour.
///
/// Consecutive shapes connect end-to-start within `tolerance`; the grapher
/// establishes that invariant before a chain is built. Shapes are owned
/// exclusively by the chain they sit in and are never shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub shapes: Vec<Shape>,
    /// Coincidence tolerance the chain was assembled with.
    pub tolerance: f64,
}

impl Chain {
    /// Build a chain from already-ordered shapes.
    pub fn new(shapes: Vec<Shape>, tolerance: f64) -> Self {
        Self { shapes, tolerance }
    }

    /// Build a chain with the default drawing tolerance.
    pub fn with_default_tolerance(shapes: Vec<Shape>) -> Self {
        Self::new(shapes, DEFAULT_TOLERANCE)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Start point of the first shape, used as the contour's rapid target.
    pub fn start_point(&self) -> Option<Point> {
        self.shapes.first().map(Shape::start_point)
    }

    /// End point of the last shape.
    pub fn end_point(&self) -> Option<Point> {
        self.shapes.last().map(Shape::end_point)
    }

    /// Whether the contour closes back on itself within tolerance.
    pub fn is_closed(&self) -> bool {
        match (self.start_point(), self.end_point()) {
            (Some(start), Some(end)) => points_coincide(start, end, self.tolerance),
            _ => false,
        }
    }

    /// Union of the member boundaries, or `None` for an empty chain.
    pub fn boundary(&self) -> Option<Rect> {
        let mut shapes = self.shapes.iter();
        let first = shapes.next()?.boundary();
        Some(shapes.fold(first, |acc, shape| acc.union(shape.boundary())))
    }

    /// Winding of the contour, derived from the signed area of its
    /// polyline approximation. Zero area reports clockwise by convention.
    ///
    /// Meaningful for closed contours; open chains get the winding of
    /// their implicit closure.
    pub fn direction(&self) -> Direction {
        let mut doubled_area = 0.0;
        let mut first: Option<Point> = None;
        let mut prev: Option<Point> = None;
        for shape in &self.shapes {
            for point in sample_shape(shape) {
                if let Some(prev) = prev {
                    doubled_area += prev.to_vec2().cross(point.to_vec2());
                }
                if first.is_none() {
                    first = Some(point);
                }
                prev = Some(point);
            }
        }
        if let (Some(first), Some(last)) = (first, prev) {
            doubled_area += last.to_vec2().cross(first.to_vec2());
        }
        if doubled_area > 0.0 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }

    /// Force the contour to the given winding, reversing the whole chain
    /// (order and every member shape) when it disagrees.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.direction() != direction {
            self.reverse();
        }
    }

    /// Reverse the traversal: the shape order flips and each shape flips
    /// with it, so the end-to-start invariant is preserved.
    pub fn reverse(&mut self) {
        self.shapes.reverse();
        for shape in &mut self.shapes {
            shape.reverse();
        }
    }

    /// Translate every member shape.
    pub fn translate(&mut self, offset: Vec2) {
        for shape in &mut self.shapes {
            shape.translate(offset);
        }
    }

    /// Rotate every member shape around `center`. Rotating around the
    /// boundary center keeps a decomposed block in place.
    pub fn rotate(&mut self, center: Point, angle: f64) {
        for shape in &mut self.shapes {
            shape.rotate(center, angle);
        }
    }
}

fn sample_shape(shape: &Shape) -> Vec<Point> {
    match shape {
        Shape::Segment(line) => vec![line.p0, line.p1],
        _ => shape.sample_points(AREA_SAMPLES),
    }
}

use kurbo::{Affine, Circle, CubicBez, Line, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, Point, QuadBez, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Number of samples used when deriving a curve's winding from its tangents.
const DIRECTION_SAMPLES: usize = 100;

/// Winding of a shape or contour, as a machine understands it (G2 vs G3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// The opposite winding.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// Mirror axis selector for [`Shape::mirror`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorAxis {
    /// Reflect across the vertical line `x = value`.
    X,
    /// Reflect across the horizontal line `y = value`.
    Y,
}

/// A circular arc with an explicit winding.
///
/// The winding is fixed when the arc is created (drawing formats describe
/// arcs counter-clockwise) and only ever flips through [`Arc::reverse`].
/// It is never re-derived from the angles, so a reversed arc renders in the
/// reversed traversal order instead of sweeping the long way around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    /// Angle of the traversal start, in radians.
    pub start_angle: f64,
    /// Angle of the traversal end, in radians.
    pub end_angle: f64,
    direction: Direction,
}

impl Arc {
    /// Create a counter-clockwise arc from `start_angle` to `end_angle`.
    pub fn new(center: Point, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
            direction: Direction::CounterClockwise,
        }
    }

    /// Create an arc with an explicit winding.
    pub fn with_direction(
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        direction: Direction,
    ) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
            direction,
        }
    }

    /// The winding this arc is traversed with.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Signed angular sweep from start to end, following the winding.
    ///
    /// Positive for counter-clockwise arcs, negative for clockwise ones.
    pub fn sweep(&self) -> f64 {
        let ccw = (self.end_angle - self.start_angle).rem_euclid(TAU);
        match self.direction {
            Direction::CounterClockwise => ccw,
            Direction::Clockwise => {
                if ccw == 0.0 {
                    0.0
                } else {
                    ccw - TAU
                }
            }
        }
    }

    /// Point at normalized parameter `t` in `[0, 1]` along the traversal.
    pub fn point_at(&self, t: f64) -> Point {
        let angle = self.start_angle + self.sweep() * t;
        self.center + Vec2::from_angle(angle) * self.radius
    }

    /// Swap the traversal ends and flip the winding.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.start_angle, &mut self.end_angle);
        self.direction = self.direction.reversed();
    }

    fn sweep_covers(&self, angle: f64) -> bool {
        let sweep = self.sweep();
        let delta = (angle - self.start_angle).rem_euclid(TAU);
        if sweep >= 0.0 {
            delta <= sweep
        } else {
            delta - TAU >= sweep
        }
    }

    fn boundary(&self) -> Rect {
        let mut rect = Rect::from_points(self.point_at(0.0), self.point_at(1.0));
        for quadrant in 0..4 {
            let angle = quadrant as f64 * PI / 2.0;
            if self.sweep_covers(angle) {
                let extremum = self.center + Vec2::from_angle(angle) * self.radius;
                rect = rect.union(Rect::from_points(extremum, extremum));
            }
        }
        rect
    }
}

/// One drawing primitive.
///
/// A closed union of every geometry a drawing layer can contribute. Each
/// variant carries its own control geometry; the shared operations below
/// are matched exhaustively so no variant can silently ignore one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// A straight line segment.
    Segment(Line),
    /// A circular arc with explicit winding.
    Arc(Arc),
    /// A full circle.
    Circle(Circle),
    /// A quadratic Bézier curve.
    QuadraticCurve(QuadBez),
    /// A cubic Bézier curve.
    CubicCurve(CubicBez),
}

impl Shape {
    /// First point of the traversal.
    pub fn start_point(&self) -> Point {
        match self {
            Shape::Segment(line) => line.p0,
            Shape::Arc(arc) => arc.point_at(0.0),
            Shape::Circle(circle) => circle.center + Vec2::new(circle.radius, 0.0),
            Shape::QuadraticCurve(quad) => quad.p0,
            Shape::CubicCurve(cubic) => cubic.p0,
        }
    }

    /// Last point of the traversal. Coincides with the start for circles.
    pub fn end_point(&self) -> Point {
        match self {
            Shape::Segment(line) => line.p1,
            Shape::Arc(arc) => arc.point_at(1.0),
            Shape::Circle(circle) => circle.center + Vec2::new(circle.radius, 0.0),
            Shape::QuadraticCurve(quad) => quad.p2,
            Shape::CubicCurve(cubic) => cubic.p3,
        }
    }

    /// Axis-aligned bounding box.
    pub fn boundary(&self) -> Rect {
        match self {
            Shape::Segment(line) => Rect::from_points(line.p0, line.p1),
            Shape::Arc(arc) => arc.boundary(),
            Shape::Circle(circle) => {
                let r = Vec2::new(circle.radius, circle.radius);
                Rect::from_points(circle.center - r, circle.center + r)
            }
            Shape::QuadraticCurve(quad) => quad.bounding_box(),
            Shape::CubicCurve(cubic) => cubic.bounding_box(),
        }
    }

    /// Winding of this shape.
    ///
    /// Segments use the angle of their direction vector: clockwise iff
    /// `atan2(dy, dx) >= 0`. Curves sum the signed cross products of
    /// consecutive sampled tangents and take the sign. Arcs report the
    /// winding fixed at creation; circles are counter-clockwise by
    /// convention. A degenerate curve (zero length or fully collinear)
    /// sums to zero and is reported clockwise by convention.
    pub fn direction(&self) -> Direction {
        match self {
            Shape::Segment(line) => {
                let v = line.p1 - line.p0;
                if v.y.atan2(v.x) >= 0.0 {
                    Direction::Clockwise
                } else {
                    Direction::CounterClockwise
                }
            }
            Shape::Arc(arc) => arc.direction(),
            Shape::Circle(_) => Direction::CounterClockwise,
            Shape::QuadraticCurve(quad) => tangent_sweep_direction(|t| quad.deriv().eval(t).to_vec2()),
            Shape::CubicCurve(cubic) => tangent_sweep_direction(|t| cubic.deriv().eval(t).to_vec2()),
        }
    }

    /// Reverse the traversal in place.
    ///
    /// Swaps the endpoints and mirrors the control points; arcs also flip
    /// their winding. A circle has no endpoints to swap, so reversing it
    /// changes nothing; its winding stays counter-clockwise by convention.
    pub fn reverse(&mut self) {
        match self {
            Shape::Segment(line) => std::mem::swap(&mut line.p0, &mut line.p1),
            Shape::Arc(arc) => arc.reverse(),
            Shape::Circle(_) => {}
            Shape::QuadraticCurve(quad) => std::mem::swap(&mut quad.p0, &mut quad.p2),
            Shape::CubicCurve(cubic) => {
                std::mem::swap(&mut cubic.p0, &mut cubic.p3);
                std::mem::swap(&mut cubic.p1, &mut cubic.p2);
            }
        }
    }

    /// Translate in place by `offset`.
    pub fn translate(&mut self, offset: Vec2) {
        self.map_points(|p| p + offset);
    }

    /// Rotate in place by `angle` radians around `center`.
    pub fn rotate(&mut self, center: Point, angle: f64) {
        match self {
            Shape::Arc(arc) => {
                arc.center = rotated(arc.center, center, angle);
                arc.start_angle += angle;
                arc.end_angle += angle;
            }
            Shape::Circle(circle) => {
                circle.center = rotated(circle.center, center, angle);
            }
            _ => self.map_points(|p| rotated(p, center, angle)),
        }
    }

    /// Reflect in place across an axis-aligned mirror line.
    ///
    /// Arcs flip their winding, since reflection reverses handedness.
    pub fn mirror(&mut self, axis: MirrorAxis, value: f64) {
        let reflect = |p: Point| match axis {
            MirrorAxis::X => Point::new(2.0 * value - p.x, p.y),
            MirrorAxis::Y => Point::new(p.x, 2.0 * value - p.y),
        };
        match self {
            Shape::Arc(arc) => {
                arc.center = reflect(arc.center);
                let map_angle = |a: f64| match axis {
                    MirrorAxis::X => PI - a,
                    MirrorAxis::Y => -a,
                };
                arc.start_angle = map_angle(arc.start_angle);
                arc.end_angle = map_angle(arc.end_angle);
                arc.direction = arc.direction.reversed();
            }
            Shape::Circle(circle) => {
                circle.center = reflect(circle.center);
            }
            _ => self.map_points(reflect),
        }
    }

    /// Apply an affine transform in place.
    ///
    /// Segments and Bézier curves accept any affine map. Arcs and circles
    /// stay circular, so the matrix must be a similarity (uniform scale,
    /// rotation, translation, optional reflection); non-uniform scale is
    /// not representable and is applied as if uniform.
    pub fn transform(&mut self, affine: Affine) {
        match self {
            Shape::Arc(arc) => {
                let [a, b, c, d, _, _] = affine.as_coeffs();
                let det = a * d - b * c;
                let scale = det.abs().sqrt();
                let rotation = b.atan2(a);
                arc.center = affine * arc.center;
                arc.radius *= scale;
                if det >= 0.0 {
                    arc.start_angle += rotation;
                    arc.end_angle += rotation;
                } else {
                    arc.start_angle = rotation - arc.start_angle;
                    arc.end_angle = rotation - arc.end_angle;
                    arc.direction = arc.direction.reversed();
                }
            }
            Shape::Circle(circle) => {
                let [a, b, c, d, _, _] = affine.as_coeffs();
                let scale = (a * d - b * c).abs().sqrt();
                circle.center = affine * circle.center;
                circle.radius *= scale;
            }
            _ => self.map_points(|p| affine * p),
        }
    }

    /// Point at normalized parameter `t` in `[0, 1]` along the traversal.
    pub fn point_at(&self, t: f64) -> Point {
        match self {
            Shape::Segment(line) => line.p0.lerp(line.p1, t),
            Shape::Arc(arc) => arc.point_at(t),
            Shape::Circle(circle) => circle.center + Vec2::from_angle(TAU * t) * circle.radius,
            Shape::QuadraticCurve(quad) => quad.eval(t),
            Shape::CubicCurve(cubic) => cubic.eval(t),
        }
    }

    /// Evenly-parameterized sample points along the traversal.
    ///
    /// `samples` must be at least 2; the first and last samples are the
    /// shape's endpoints.
    pub fn sample_points(&self, samples: usize) -> Vec<Point> {
        let samples = samples.max(2);
        (0..samples)
            .map(|i| self.point_at(i as f64 / (samples - 1) as f64))
            .collect()
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            Shape::Segment(_) => "segment",
            Shape::Arc(_) => "arc",
            Shape::Circle(_) => "circle",
            Shape::QuadraticCurve(_) => "quadratic curve",
            Shape::CubicCurve(_) => "cubic curve",
        }
    }

    fn map_points(&mut self, f: impl Fn(Point) -> Point) {
        match self {
            Shape::Segment(line) => {
                line.p0 = f(line.p0);
                line.p1 = f(line.p1);
            }
            Shape::Arc(arc) => {
                arc.center = f(arc.center);
            }
            Shape::Circle(circle) => {
                circle.center = f(circle.center);
            }
            Shape::QuadraticCurve(quad) => {
                quad.p0 = f(quad.p0);
                quad.p1 = f(quad.p1);
                quad.p2 = f(quad.p2);
            }
            Shape::CubicCurve(cubic) => {
                cubic.p0 = f(cubic.p0);
                cubic.p1 = f(cubic.p1);
                cubic.p2 = f(cubic.p2);
                cubic.p3 = f(cubic.p3);
            }
        }
    }
}

/// Winding from the sign of the summed tangent turn along the curve.
fn tangent_sweep_direction(tangent_at: impl Fn(f64) -> Vec2) -> Direction {
    let mut total = 0.0;
    let mut prev = tangent_at(0.0);
    for i in 1..DIRECTION_SAMPLES {
        let t = i as f64 / (DIRECTION_SAMPLES - 1) as f64;
        let tangent = tangent_at(t);
        total += prev.cross(tangent);
        prev = tangent;
    }
    if total > 0.0 {
        Direction::CounterClockwise
    } else {
        Direction::Clockwise
    }
}

fn rotated(p: Point, center: Point, angle: f64) -> Point {
    let v = p - center;
    let (sin, cos) = angle.sin_cos();
    center + Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

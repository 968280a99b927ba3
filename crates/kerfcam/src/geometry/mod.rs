use kurbo::Point;

pub mod shape;

pub use shape::{Arc, Direction, MirrorAxis, Shape};

/// Default connection tolerance in drawing units.
///
/// Two endpoints closer than this are considered coincident when
/// reassembling contours from a parsed drawing.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Tolerance-based point equality.
///
/// Exact float comparison is never meaningful here: every upstream
/// measurement and every curve sampling step carries rounding error.
pub fn points_coincide(a: Point, b: Point, tolerance: f64) -> bool {
    a.distance(b) <= tolerance
}

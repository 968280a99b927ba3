//! Error types for the geometry kernel.

use thiserror::Error;

/// Errors that can occur while assembling or analyzing contours.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// A shape the polyline approximation cannot sample (non-finite
    /// coordinates or radius).
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// Strict chain sorting found no shape that connects to the current
    /// chain tail within tolerance.
    #[error(
        "disconnected sequence: no shape reaches ({x:.4}, {y:.4}) within \
         tolerance {tolerance} ({remaining} shapes unplaced)"
    )]
    DisconnectedSequence {
        /// X coordinate of the dangling chain tail.
        x: f64,
        /// Y coordinate of the dangling chain tail.
        y: f64,
        /// Connection tolerance that was in effect.
        tolerance: f64,
        /// Number of shapes that could not be placed.
        remaining: usize,
    },
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, GeometryError>;

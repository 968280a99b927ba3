mod chain;
mod containment;
mod error;
mod geometry;
mod grapher;
mod kerf;
mod offset;
mod parts;

pub use chain::Chain;
pub use containment::chain_contains;
pub use error::{GeometryError, Result};
pub use geometry::{points_coincide, Arc, Direction, MirrorAxis, Shape, DEFAULT_TOLERANCE};
pub use grapher::{graph_shapes, reorient_shapes, sort_into_chain};
pub use kerf::{kerf_compensated_chain, CutSide};
pub use offset::offset_cubic_curve;
pub use parts::{build_parts, Part};

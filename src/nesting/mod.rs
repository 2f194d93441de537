pub mod index;
pub mod nester;

pub use index::{RTreeIndex, SpatialIndex};
pub use nester::{NestOutcome, PolygonNester};

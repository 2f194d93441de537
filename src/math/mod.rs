pub mod polygon_2d;

pub use polygon_2d::{point_in_ring, rotate_to_canonical_start, signed_area, Aabb, Winding};

/// 2D point type. `x` grows with the raster column, `y` with the raster row.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

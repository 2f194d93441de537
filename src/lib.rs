pub mod error;
pub mod feature;
pub mod isoband;
pub mod math;
pub mod nesting;
pub mod operations;
pub mod params;
pub mod source;
pub mod stitch;
pub mod topology;

pub use error::{ContourError, Result};

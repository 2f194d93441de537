pub mod border;
mod seam;
pub mod stitcher;

pub use border::{BorderGuard, BORDER_ORIGIN};
pub use stitcher::TileStitcher;

mod contour;

pub use contour::ContourRaster;

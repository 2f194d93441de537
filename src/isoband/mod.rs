mod classification;
mod table;
mod tile;
mod trace;

pub use classification::{Classification, Side};
pub use table::{CellSegments, ContourTable, Segment, MAX_SEGMENTS, TABLE_SIZE};
pub use tile::{Tile, TileContours};
pub use trace::{OpenEdge, OpenEdges, TileTracer, TracedTile};

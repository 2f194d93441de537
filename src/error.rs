use thiserror::Error;

use crate::isoband::Side;

/// Top-level error type for the isotile contouring engine.
#[derive(Debug, Error)]
pub enum ContourError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// A collaborator (feature factory, spatial index, raster source) failed.
    /// The original error is kept as-is.
    #[error("collaborator failed: {0}")]
    External(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ContourError {
    /// Wraps a collaborator error without altering it.
    pub fn external<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::External(Box::new(error))
    }
}

/// Malformed raster input, rejected when a tile is constructed.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("classification {value} at column {column}, row {row} is outside {{-1, 0, 1}}")]
    ClassificationOutOfRange { value: i8, column: usize, row: usize },

    #[error("corner value {0} is outside {{-1, 0, 1}}")]
    CornerOutOfRange(i8),

    #[error("tile must contain at least one cell, got {width}x{height}")]
    EmptyTile { width: usize, height: usize },

    #[error("classification buffer holds {actual} values, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("tile size must span at least 2 pixels, got {0}")]
    TileSize(usize),
}

/// Which seam a stitch was working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeamKind {
    /// Between a tile and the tile above it.
    NorthSouth,
    /// Between a tile and the tile to its left.
    WestEast,
}

/// Tiles fed in a shape the stitcher cannot join.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{kind:?} seam lists differ in length: {first} vs {second}")]
    SeamLengthMismatch {
        kind: SeamKind,
        first: usize,
        second: usize,
    },

    #[error("row has {actual} tiles but the row above has {expected}")]
    RowTileCount { expected: usize, actual: usize },

    #[error("tile in column {column} is {actual} cells wide, expected {expected}")]
    ColumnWidthMismatch {
        column: usize,
        expected: usize,
        actual: usize,
    },

    #[error("tile is {actual} cells tall, row height is {expected}")]
    RowHeightMismatch { expected: usize, actual: usize },

    #[error("a new row was requested before any tile was added to the current row")]
    EmptyRow,

    #[error("the stitcher has already been closed")]
    Closed,
}

/// Which link slot of a point was involved in a failed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSlot {
    Inbound,
    Outbound,
}

/// Internal consistency failures. These point at a table or stitching
/// defect and are never recovered from.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("{slot:?} slot of point at ({x}, {y}) is already committed")]
    SlotCommitted { slot: LinkSlot, x: f64, y: f64 },

    #[error("no segment in cell ({column}, {row}) continues across its {side:?} side")]
    UnmatchedSegment {
        column: usize,
        row: usize,
        side: Side,
    },

    #[error("seam cell at ({x}, {y}) has a crossing on its {side:?} side but the tile recorded no point")]
    MissingSeamPoint { x: f64, y: f64, side: Side },

    #[error("point is not part of the graph")]
    UnknownPoint,

    #[error("point at ({x}, {y}) does not belong to a chain")]
    DetachedPoint { x: f64, y: f64 },

    #[error("point at ({x}, {y}) was already collected into a chain")]
    AlreadyCollected { x: f64, y: f64 },

    #[error("point at ({x}, {y}) is not a free end of its chain")]
    NotChainEnd { x: f64, y: f64 },

    #[error("{0} chains are still open after the border was closed")]
    UnclosedChains(usize),
}

/// Convenience type alias for results using [`ContourError`].
pub type Result<T> = std::result::Result<T, ContourError>;

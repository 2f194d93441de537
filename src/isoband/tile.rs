use std::cell::OnceCell;

use super::classification::{Classification, Side};
use super::table::{CellSegments, ContourTable};
use super::trace::{OpenEdges, TileTracer};
use crate::error::{Result, ValidationError};
use crate::topology::{ClosedRing, PointGraph};

/// One rectangle of the classified raster.
///
/// A tile of `width × height` cells holds `(width + 1) × (height + 1)`
/// classifications in row-major order. Neighbouring tiles do not share
/// pixels; the cells between them are contoured when the tiles are stitched.
#[derive(Debug, Clone)]
pub struct Tile {
    width: usize,
    height: usize,
    classes: Vec<Classification>,
    cells: OnceCell<Vec<CellSegments>>,
}

impl Tile {
    /// Creates a tile from raw `{-1, 0, 1}` values.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the tile has no cells, the buffer has
    /// the wrong length, or any value is outside `{-1, 0, 1}`.
    pub fn new(width: usize, height: usize, values: &[i8]) -> Result<Self> {
        Self::check_size(width, height, values.len())?;
        let columns = width + 1;
        let classes = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                Classification::from_raw(value).ok_or(ValidationError::ClassificationOutOfRange {
                    value,
                    column: i % columns,
                    row: i / columns,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(width, height, classes))
    }

    /// Creates a tile from already classified points.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the tile has no cells or the buffer has
    /// the wrong length.
    pub fn from_classes(width: usize, height: usize, classes: Vec<Classification>) -> Result<Self> {
        Self::check_size(width, height, classes.len())?;
        Ok(Self::from_parts(width, height, classes))
    }

    /// A tile where every point has the same classification.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTile` if either dimension is zero.
    pub fn uniform(width: usize, height: usize, class: Classification) -> Result<Self> {
        Self::from_classes(width, height, vec![class; (width + 1) * (height + 1)])
    }

    fn from_parts(width: usize, height: usize, classes: Vec<Classification>) -> Self {
        Self {
            width,
            height,
            classes,
            cells: OnceCell::new(),
        }
    }

    fn check_size(width: usize, height: usize, actual: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(ValidationError::EmptyTile { width, height }.into());
        }
        let expected = (width + 1) * (height + 1);
        if actual != expected {
            return Err(ValidationError::BufferSize { expected, actual }.into());
        }
        Ok(())
    }

    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Classification of the point at `(column, row)`, or `None` if the
    /// point lies outside the tile.
    #[must_use]
    pub fn class_at(&self, column: usize, row: usize) -> Option<Classification> {
        if column > self.width || row > self.height {
            return None;
        }
        self.classes.get(row * (self.width + 1) + column).copied()
    }

    fn class(&self, column: usize, row: usize) -> Classification {
        self.classes[row * (self.width + 1) + column]
    }

    /// Corner classifications of cell `(cx, cy)` in NW, NE, SE, SW order.
    pub(crate) fn corners(&self, cx: usize, cy: usize) -> [Classification; 4] {
        [
            self.class(cx, cy),
            self.class(cx + 1, cy),
            self.class(cx + 1, cy + 1),
            self.class(cx, cy + 1),
        ]
    }

    /// Classifications of the two ends of a boundary side of cell
    /// `(cx, cy)`, ordered along the boundary: left to right for top and
    /// bottom sides, top to bottom for left and right sides.
    pub(crate) fn side_classes(&self, cx: usize, cy: usize, side: Side) -> [Classification; 2] {
        let [nw, ne, se, sw] = self.corners(cx, cy);
        match side {
            Side::Top => [nw, ne],
            Side::Right => [ne, se],
            Side::Bottom => [sw, se],
            Side::Left => [nw, sw],
        }
    }

    /// Per-cell contour segments, row-major, computed on first use.
    pub fn isoband(&self) -> &[CellSegments] {
        self.cells.get_or_init(|| {
            let mut cells = Vec::with_capacity(self.width * self.height);
            for cy in 0..self.height {
                for cx in 0..self.width {
                    cells.push(*ContourTable::lookup(self.corners(cx, cy)));
                }
            }
            cells
        })
    }

    /// Segments of cell `(cx, cy)`.
    pub(crate) fn cell(&self, cx: usize, cy: usize) -> &CellSegments {
        &self.isoband()[cy * self.width + cx]
    }

    /// Total number of segments across all cells.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.isoband().iter().map(CellSegments::len).sum()
    }

    /// Traces this tile on its own, with its NW pixel at the origin.
    ///
    /// # Errors
    ///
    /// Returns an `InvariantViolation` if the segments cannot be linked.
    pub fn build(&self) -> Result<TileContours> {
        let mut graph = PointGraph::new();
        let traced = TileTracer::new(self).trace(&mut graph, (0, 0))?;
        Ok(TileContours {
            rings: traced.rings,
            edges: traced.edges,
            graph,
        })
    }
}

/// The result of tracing a tile in isolation.
#[derive(Debug)]
pub struct TileContours {
    /// Rings that closed inside the tile.
    pub rings: Vec<ClosedRing>,
    /// Boundary samples; their points live in `graph`.
    pub edges: OpenEdges,
    /// The open chains reaching the tile boundary.
    pub graph: PointGraph,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ContourError;

    #[test]
    fn rejects_out_of_range_values() {
        let err = Tile::new(1, 1, &[0, 1, -1, 3]).unwrap_err();
        assert!(matches!(
            err,
            ContourError::Validation(ValidationError::ClassificationOutOfRange {
                value: 3,
                column: 1,
                row: 1
            })
        ));
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(matches!(
            Tile::new(0, 2, &[]).unwrap_err(),
            ContourError::Validation(ValidationError::EmptyTile { .. })
        ));
        assert!(matches!(
            Tile::new(2, 2, &[0; 8]).unwrap_err(),
            ContourError::Validation(ValidationError::BufferSize {
                expected: 9,
                actual: 8
            })
        ));
    }

    #[test]
    fn uniform_tiles_have_no_segments() {
        for class in [Classification::Below, Classification::At, Classification::Above] {
            let tile = Tile::uniform(4, 3, class).unwrap();
            assert_eq!(tile.isoband().len(), 12);
            assert_eq!(tile.segment_count(), 0);
        }
    }

    #[test]
    fn corners_follow_clockwise_order() {
        #[rustfmt::skip]
        let tile = Tile::new(1, 1, &[
            -1, 0,
             1, -1,
        ]).unwrap();
        assert_eq!(
            tile.corners(0, 0),
            [
                Classification::Below,
                Classification::At,
                Classification::Below,
                Classification::Above
            ]
        );
        assert_eq!(
            tile.side_classes(0, 0, Side::Left),
            [Classification::Below, Classification::Above]
        );
    }

    #[test]
    fn class_at_outside_the_tile_is_none() {
        let tile = Tile::new(2, 1, &[-1, 0, 1, 1, 0, -1]).unwrap();
        assert_eq!(tile.class_at(2, 0), Some(Classification::Above));
        assert_eq!(tile.class_at(0, 1), Some(Classification::Above));
        assert_eq!(tile.class_at(3, 0), None);
        assert_eq!(tile.class_at(0, 2), None);
    }

    #[test]
    fn isoband_is_computed_once() {
        let tile = Tile::new(2, 1, &[-1, 1, -1, -1, -1, -1]).unwrap();
        let first = tile.isoband().as_ptr();
        let second = tile.isoband().as_ptr();
        assert_eq!(first, second);
        assert_eq!(tile.segment_count(), 2);
    }
}

use tracing::info;

use super::stitcher::TileStitcher;
use crate::error::{ConfigurationError, InvariantViolation, Result};
use crate::feature::{Feature, FeatureFactory, SequentialIds};
use crate::isoband::{Classification, Tile};
use crate::params::ContourParams;

/// Stitcher origin that keeps real pixel `(0, 0)` at coordinate `(0, 0)`:
/// a one-cell border tile spans two pixels.
pub const BORDER_ORIGIN: (i64, i64) = (-2, -2);

/// Wraps a [`TileStitcher`] in a ring of all-`Below` tiles so every contour
/// closes before the stream ends.
///
/// The first row is held back until it is complete, since the border row
/// above it must match its column widths. Later rows stream straight through
/// with a border tile on each end.
#[derive(Debug)]
pub struct BorderGuard<F = SequentialIds> {
    stitcher: TileStitcher<F>,
    /// Tiles of the first row, until its width is known.
    first_row: Vec<Tile>,
    /// Column widths, fixed once the first row is flushed.
    columns: Option<Vec<usize>>,
    /// Tiles added to the current streaming row.
    column: usize,
    row_height: usize,
    closed: bool,
}

impl BorderGuard<SequentialIds> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(SequentialIds::default())
    }
}

impl Default for BorderGuard<SequentialIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FeatureFactory> BorderGuard<F> {
    #[must_use]
    pub fn with_factory(factory: F) -> Self {
        let (x, y) = BORDER_ORIGIN;
        Self {
            stitcher: TileStitcher::with_factory(factory).with_origin(x, y),
            first_row: Vec::new(),
            columns: None,
            column: 0,
            row_height: 0,
            closed: false,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: &ContourParams) -> Self {
        self.stitcher = self.stitcher.with_params(params);
        self
    }

    /// Adds the next tile of the current row.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the guard is closed, the tile does
    /// not match the column widths of the first row or the height of its
    /// row, or the row already has every column; stitching errors are
    /// passed through.
    pub fn add_east(&mut self, tile: Tile) -> Result<()> {
        self.ensure_open()?;
        let Some(columns) = &self.columns else {
            if let Some(first) = self.first_row.first() {
                if first.height() != tile.height() {
                    return Err(ConfigurationError::RowHeightMismatch {
                        expected: first.height(),
                        actual: tile.height(),
                    }
                    .into());
                }
            }
            self.first_row.push(tile);
            return Ok(());
        };

        let expected = *columns.get(self.column).ok_or(ConfigurationError::RowTileCount {
            expected: columns.len(),
            actual: self.column + 1,
        })?;
        if tile.width() != expected {
            return Err(ConfigurationError::ColumnWidthMismatch {
                column: self.column,
                expected,
                actual: tile.width(),
            }
            .into());
        }
        if self.column == 0 {
            self.row_height = tile.height();
            self.stitcher.add_east(&border(1, tile.height())?)?;
        } else if tile.height() != self.row_height {
            return Err(ConfigurationError::RowHeightMismatch {
                expected: self.row_height,
                actual: tile.height(),
            }
            .into());
        }
        self.stitcher.add_east(&tile)?;
        self.column += 1;
        Ok(())
    }

    /// Ends the current row.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the guard is closed, the row is
    /// empty, or the row is missing columns.
    pub fn add_new_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.columns.is_none() {
            if self.first_row.is_empty() {
                return Err(ConfigurationError::EmptyRow.into());
            }
            return self.flush_first_row();
        }
        self.end_row()
    }

    /// Finishes the raster with the bottom border and returns every feature.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Closed` on a second call, the same errors
    /// as [`BorderGuard::add_new_row`] for an incomplete last row, and
    /// `InvariantViolation::UnclosedChains` if any contour is left open.
    pub fn close(&mut self) -> Result<Vec<Feature>> {
        self.ensure_open()?;
        self.closed = true;

        if self.columns.is_none() {
            if self.first_row.is_empty() {
                info!("closed empty raster");
                return Ok(Vec::new());
            }
            self.flush_first_row()?;
        } else if self.column > 0 {
            self.end_row()?;
        }
        let widths = self.columns.clone().unwrap_or_default();
        self.border_row(&widths)?;

        let open = self.stitcher.open_chain_count();
        if open > 0 {
            return Err(InvariantViolation::UnclosedChains(open).into());
        }
        let features = self.stitcher.take_features();
        info!(features = features.len(), columns = widths.len(), "closed raster");
        Ok(features)
    }

    /// Number of chains still open in the wrapped stitcher.
    #[must_use]
    pub fn open_chain_count(&self) -> usize {
        self.stitcher.open_chain_count()
    }

    /// Features closed so far.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        self.stitcher.features()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ConfigurationError::Closed.into());
        }
        Ok(())
    }

    /// Emits the top border row followed by the buffered first row.
    fn flush_first_row(&mut self) -> Result<()> {
        let tiles = std::mem::take(&mut self.first_row);
        let widths: Vec<usize> = tiles.iter().map(Tile::width).collect();
        let height = tiles.first().map_or(1, Tile::height);

        self.border_row(&widths)?;
        self.stitcher.add_new_row()?;

        self.stitcher.add_east(&border(1, height)?)?;
        for tile in &tiles {
            self.stitcher.add_east(tile)?;
        }
        self.stitcher.add_east(&border(1, height)?)?;
        self.stitcher.add_new_row()?;

        self.columns = Some(widths);
        self.column = 0;
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        let expected = self.columns.as_ref().map_or(0, Vec::len);
        if self.column == 0 {
            return Err(ConfigurationError::EmptyRow.into());
        }
        if self.column != expected {
            return Err(ConfigurationError::RowTileCount {
                expected,
                actual: self.column,
            }
            .into());
        }
        self.stitcher.add_east(&border(1, self.row_height)?)?;
        self.stitcher.add_new_row()?;
        self.column = 0;
        Ok(())
    }

    /// A one-cell-tall row of border tiles matching the column widths.
    fn border_row(&mut self, widths: &[usize]) -> Result<()> {
        self.stitcher.add_east(&border(1, 1)?)?;
        for &width in widths {
            self.stitcher.add_east(&border(width, 1)?)?;
        }
        self.stitcher.add_east(&border(1, 1)?)
    }
}

fn border(width: usize, height: usize) -> Result<Tile> {
    Tile::uniform(width, height, Classification::Below)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::ContourError;
    use crate::math::{Point2, Winding};

    fn tile(width: usize, height: usize, values: &[i8]) -> Tile {
        Tile::new(width, height, values).unwrap()
    }

    #[test]
    fn single_peak_closes_into_a_diamond() {
        #[rustfmt::skip]
        let t = tile(2, 2, &[
            -1, -1, -1,
            -1,  1, -1,
            -1, -1, -1,
        ]);
        let mut guard = BorderGuard::new();
        guard.add_east(t).unwrap();
        let features = guard.close().unwrap();
        assert_eq!(features.len(), 1);
        let mut vertices = features[0].points[..4].to_vec();
        vertices.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        let expected = [
            Point2::new(0.5, 1.0),
            Point2::new(1.0, 0.5),
            Point2::new(1.0, 1.5),
            Point2::new(1.5, 1.0),
        ];
        for (v, e) in vertices.iter().zip(expected.iter()) {
            assert_relative_eq!(*v, *e);
        }
    }

    #[test]
    fn contour_crossing_two_tiles_becomes_one_feature() {
        // The inside band leaves the west tile through its right edge and
        // enters the east tile through its left edge.
        #[rustfmt::skip]
        let west = tile(2, 2, &[
            -1, -1, -1,
            -1,  1,  1,
            -1, -1, -1,
        ]);
        #[rustfmt::skip]
        let east = tile(2, 2, &[
            -1, -1, -1,
             1,  1, -1,
            -1, -1, -1,
        ]);
        let mut guard = BorderGuard::new();
        guard.add_east(west).unwrap();
        guard.add_east(east).unwrap();
        let features = guard.close().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].winding(), Winding::CounterClockwise);
        assert_eq!(guard.open_chain_count(), 0);
    }

    #[test]
    fn inside_region_touching_the_raster_edge_is_closed_by_the_border() {
        let mut guard = BorderGuard::new();
        guard.add_east(tile(1, 1, &[1, 1, 1, 1])).unwrap();
        guard.add_east(tile(1, 1, &[1, 1, 1, -1])).unwrap();
        guard.add_new_row().unwrap();
        guard.add_east(tile(1, 1, &[1, 1, -1, -1])).unwrap();
        guard.add_east(tile(1, 1, &[-1, -1, -1, -1])).unwrap();
        let features = guard.close().unwrap();
        assert_eq!(features.len(), 1);
        let feature = &features[0];
        assert_eq!(feature.winding(), Winding::CounterClockwise);
        let bbox = feature.bbox().unwrap();
        assert_relative_eq!(bbox.min.x, -0.5);
        assert_relative_eq!(bbox.min.y, -0.5);
    }

    #[test]
    fn empty_raster_closes_to_nothing() {
        let mut guard = BorderGuard::new();
        assert!(guard.close().unwrap().is_empty());
    }

    #[test]
    fn use_after_close_is_rejected() {
        let mut guard = BorderGuard::new();
        guard.add_east(Tile::uniform(2, 2, Classification::Above).unwrap()).unwrap();
        assert_eq!(guard.close().unwrap().len(), 1);
        for err in [
            guard.close().unwrap_err(),
            guard.add_new_row().unwrap_err(),
            guard
                .add_east(Tile::uniform(2, 2, Classification::Below).unwrap())
                .unwrap_err(),
        ] {
            assert!(matches!(
                err,
                ContourError::Configuration(ConfigurationError::Closed)
            ));
        }
    }

    #[test]
    fn column_widths_must_match_the_first_row() {
        let mut guard = BorderGuard::new();
        guard.add_east(Tile::uniform(2, 1, Classification::Below).unwrap()).unwrap();
        guard.add_east(Tile::uniform(3, 1, Classification::Below).unwrap()).unwrap();
        guard.add_new_row().unwrap();
        guard.add_east(Tile::uniform(2, 2, Classification::Below).unwrap()).unwrap();
        assert!(matches!(
            guard
                .add_east(Tile::uniform(2, 2, Classification::Below).unwrap())
                .unwrap_err(),
            ContourError::Configuration(ConfigurationError::ColumnWidthMismatch {
                column: 1,
                expected: 3,
                actual: 2,
            })
        ));
    }

    #[test]
    fn first_row_heights_must_agree() {
        let mut guard = BorderGuard::new();
        guard.add_east(Tile::uniform(2, 1, Classification::Below).unwrap()).unwrap();
        assert!(matches!(
            guard
                .add_east(Tile::uniform(2, 2, Classification::Below).unwrap())
                .unwrap_err(),
            ContourError::Configuration(ConfigurationError::RowHeightMismatch {
                expected: 1,
                actual: 2,
            })
        ));
    }

    #[test]
    fn incomplete_last_row_fails_on_close() {
        let mut guard = BorderGuard::new();
        guard.add_east(Tile::uniform(1, 1, Classification::Below).unwrap()).unwrap();
        guard.add_east(Tile::uniform(1, 1, Classification::Below).unwrap()).unwrap();
        guard.add_new_row().unwrap();
        guard.add_east(Tile::uniform(1, 1, Classification::Below).unwrap()).unwrap();
        assert!(matches!(
            guard.close().unwrap_err(),
            ContourError::Configuration(ConfigurationError::RowTileCount {
                expected: 2,
                actual: 1,
            })
        ));
    }
}

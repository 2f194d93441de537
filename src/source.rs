use crate::error::{Result, ValidationError};
use crate::isoband::{Classification, Tile};

/// One step of a row-major tile stream.
#[derive(Debug, Clone)]
pub enum RasterEvent {
    /// The next tile, east of the previous one in the current row.
    Tile(Tile),
    /// The current row is complete; the next tile starts a new row.
    NewRow,
}

/// Anything that yields tiles in row-major order.
pub trait RasterSource: Iterator<Item = Result<RasterEvent>> {}

impl<T> RasterSource for T where T: Iterator<Item = Result<RasterEvent>> {}

/// Splits an in-memory classification grid into tiles.
///
/// Tiles cover disjoint pixel ranges of at most `tile_size` pixels per axis.
/// A single leftover pixel at the end of an axis cannot form a cell on its
/// own and is folded into the last tile of that axis.
#[derive(Debug, Clone)]
pub struct GridSource {
    width: usize,
    classes: Vec<Classification>,
    columns: Vec<(usize, usize)>,
    rows: Vec<(usize, usize)>,
    row: usize,
    column: usize,
}

impl GridSource {
    /// Creates a source over a `width × height` pixel grid of raw
    /// `{-1, 0, 1}` values in row-major order.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if `tile_size` is below 2, the grid has
    /// fewer than 2 pixels along an axis, the buffer has the wrong length,
    /// or a value is outside `{-1, 0, 1}`.
    pub fn new(width: usize, height: usize, values: &[i8], tile_size: usize) -> Result<Self> {
        if tile_size < 2 {
            return Err(ValidationError::TileSize(tile_size).into());
        }
        if width < 2 || height < 2 {
            return Err(ValidationError::EmptyTile {
                width: width.saturating_sub(1),
                height: height.saturating_sub(1),
            }
            .into());
        }
        if values.len() != width * height {
            return Err(ValidationError::BufferSize {
                expected: width * height,
                actual: values.len(),
            }
            .into());
        }
        let classes = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                Classification::from_raw(value).ok_or(ValidationError::ClassificationOutOfRange {
                    value,
                    column: i % width,
                    row: i / width,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            width,
            classes,
            columns: spans(width, tile_size),
            rows: spans(height, tile_size),
            row: 0,
            column: 0,
        })
    }

    /// Pixel widths of the tile columns.
    #[must_use]
    pub fn column_widths(&self) -> Vec<usize> {
        self.columns.iter().map(|&(_, len)| len).collect()
    }

    /// Pixel heights of the tile rows.
    #[must_use]
    pub fn row_heights(&self) -> Vec<usize> {
        self.rows.iter().map(|&(_, len)| len).collect()
    }

    fn tile(&self, (x, w): (usize, usize), (y, h): (usize, usize)) -> Result<Tile> {
        let mut classes = Vec::with_capacity(w * h);
        for row in y..y + h {
            let start = row * self.width + x;
            classes.extend_from_slice(&self.classes[start..start + w]);
        }
        Tile::from_classes(w - 1, h - 1, classes)
    }
}

impl Iterator for GridSource {
    type Item = Result<RasterEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = *self.rows.get(self.row)?;
        if self.column == self.columns.len() {
            self.row += 1;
            self.column = 0;
            return (self.row < self.rows.len()).then_some(Ok(RasterEvent::NewRow));
        }
        let column = self.columns[self.column];
        self.column += 1;
        Some(self.tile(column, row).map(RasterEvent::Tile))
    }
}

/// `(start, length)` pixel spans of at most `size` pixels covering `total`.
fn spans(total: usize, size: usize) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    while start < total {
        let len = size.min(total - start);
        match spans.last_mut() {
            Some(last) if len < 2 => last.1 += len,
            _ => spans.push((start, len)),
        }
        start += len;
    }
    spans
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ContourError;

    #[test]
    fn spans_fold_a_single_leftover_pixel() {
        assert_eq!(spans(7, 3), vec![(0, 3), (3, 4)]);
        assert_eq!(spans(8, 3), vec![(0, 3), (3, 3), (6, 2)]);
        assert_eq!(spans(5, 8), vec![(0, 5)]);
    }

    #[test]
    fn events_are_row_major() {
        let values = vec![-1i8; 5 * 4];
        let source = GridSource::new(5, 4, &values, 3).unwrap();
        assert_eq!(source.column_widths(), vec![3, 2]);
        assert_eq!(source.row_heights(), vec![4]);

        let source = GridSource::new(5, 6, &vec![-1i8; 30], 3).unwrap();
        let events: Vec<RasterEvent> = source.map(Result::unwrap).collect();
        let shape: Vec<String> = events
            .iter()
            .map(|e| match e {
                RasterEvent::Tile(t) => format!("{}x{}", t.width(), t.height()),
                RasterEvent::NewRow => "/".to_owned(),
            })
            .collect();
        assert_eq!(shape, vec!["2x2", "1x2", "/", "2x2", "1x2"]);
    }

    #[test]
    fn tiles_carry_their_own_pixels() {
        #[rustfmt::skip]
        let values = [
            -1, -1,  0,  1,
            -1,  1,  0,  1,
        ];
        let mut source = GridSource::new(4, 2, &values, 2).unwrap();
        let Some(Ok(RasterEvent::Tile(west))) = source.next() else {
            panic!("expected a tile");
        };
        let Some(Ok(RasterEvent::Tile(east))) = source.next() else {
            panic!("expected a tile");
        };
        assert!(source.next().is_none());
        assert_eq!(west.class_at(1, 1), Some(Classification::Above));
        assert_eq!(east.class_at(0, 0), Some(Classification::At));
        assert_eq!(east.class_at(1, 1), Some(Classification::Above));
    }

    #[test]
    fn invalid_grids_are_rejected() {
        assert!(matches!(
            GridSource::new(3, 3, &[0; 9], 1).unwrap_err(),
            ContourError::Validation(ValidationError::TileSize(1))
        ));
        assert!(matches!(
            GridSource::new(3, 3, &[0; 8], 2).unwrap_err(),
            ContourError::Validation(ValidationError::BufferSize { expected: 9, actual: 8 })
        ));
        let mut values = [0i8; 9];
        values[5] = 4;
        assert!(matches!(
            GridSource::new(3, 3, &values, 2).unwrap_err(),
            ContourError::Validation(ValidationError::ClassificationOutOfRange {
                value: 4,
                column: 2,
                row: 1,
            })
        ));
    }
}

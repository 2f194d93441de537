use tracing::{debug, trace};

use super::seam;
use crate::error::{ConfigurationError, Result, SeamKind};
use crate::feature::{Feature, FeatureFactory, SequentialIds};
use crate::isoband::{OpenEdge, OpenEdges, Side, Tile, TileTracer};
use crate::params::ContourParams;
use crate::topology::{ClosedRing, PointGraph, PointId};

/// What the stitcher keeps of a tile once it has been traced.
#[derive(Debug, Clone)]
struct PlacedTile {
    x: i64,
    width: usize,
    height: usize,
    /// Right boundary, extended at the top by the east end of the seam above.
    right: Vec<OpenEdge>,
    bottom: Vec<OpenEdge>,
    /// Point on the bottom end of the seam to the west of this tile.
    corner: Option<PointId>,
}

/// Joins traced tiles, fed row by row from the north-west, into polygons.
///
/// Tiles do not share pixels: each tile is placed one pixel past its west
/// and north neighbours and the one-cell gap between them is contoured from
/// the classifications kept on the tiles' open edges. Every chain that
/// closes is handed to the [`FeatureFactory`] immediately; only the open
/// contour frontier stays in memory.
#[derive(Debug)]
pub struct TileStitcher<F = SequentialIds> {
    graph: PointGraph,
    factory: F,
    features: Vec<Feature>,
    north: Option<Vec<PlacedTile>>,
    row: Vec<PlacedTile>,
    origin_x: i64,
    x_offset: i64,
    y_offset: i64,
}

impl TileStitcher<SequentialIds> {
    /// Creates a stitcher that numbers its features under `"id"`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(SequentialIds::default())
    }
}

impl Default for TileStitcher<SequentialIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FeatureFactory> TileStitcher<F> {
    /// Creates a stitcher that turns closed rings into features with `factory`.
    #[must_use]
    pub fn with_factory(factory: F) -> Self {
        Self {
            graph: PointGraph::new(),
            factory,
            features: Vec::new(),
            north: None,
            row: Vec::new(),
            origin_x: 0,
            x_offset: 0,
            y_offset: 0,
        }
    }

    /// Places the NW pixel of the first tile at `(x, y)`.
    #[must_use]
    pub fn with_origin(mut self, x: i64, y: i64) -> Self {
        self.origin_x = x;
        self.x_offset = x;
        self.y_offset = y;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: &ContourParams) -> Self {
        self.graph = std::mem::take(&mut self.graph).with_simplify(params.simplify_collinear);
        self
    }

    /// Adds `tile` east of the last tile in the current row.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the tile does not line up with its
    /// north or west neighbour, or an `InvariantViolation` if its contours
    /// cannot be linked.
    #[allow(clippy::cast_possible_wrap)]
    pub fn add_east(&mut self, tile: &Tile) -> Result<()> {
        let column = self.row.len();
        let north = north_of(self.north.as_deref(), column, tile)?;
        let west = self.row.last();
        if let Some(west) = west {
            if west.height != tile.height() {
                let extra = usize::from(north.is_some());
                return Err(ConfigurationError::SeamLengthMismatch {
                    kind: SeamKind::WestEast,
                    first: west.height + extra,
                    second: tile.height() + extra,
                }
                .into());
            }
        }

        let (x, y) = (self.x_offset, self.y_offset);
        let traced = TileTracer::new(tile).trace(&mut self.graph, (x, y))?;
        let mut rings = traced.rings;
        let OpenEdges {
            top,
            mut right,
            bottom,
            mut left,
        } = traced.edges;

        if let Some(north) = north {
            let walk = seam::walk(
                &mut self.graph,
                SeamKind::NorthSouth,
                &north.bottom,
                &top,
                (x, y - 1),
                None,
            )?;
            rings.extend(walk.rings);
            if let (Some(n0), Some(t0), Some(n1), Some(t1)) =
                (north.bottom.first(), top.first(), north.bottom.last(), top.last())
            {
                left.insert(
                    0,
                    OpenEdge {
                        point: walk.first,
                        side: Side::Left,
                        classes: [n0.classes[0], t0.classes[0]],
                    },
                );
                right.insert(
                    0,
                    OpenEdge {
                        point: walk.last,
                        side: Side::Right,
                        classes: [n1.classes[1], t1.classes[1]],
                    },
                );
            }
        }

        let mut corner = None;
        if let Some(west) = west {
            let top_y = if north.is_some() { y - 1 } else { y };
            let walk = seam::walk(
                &mut self.graph,
                SeamKind::WestEast,
                &west.right,
                &left,
                (west.x + west.width as i64, top_y),
                north.and_then(|n| n.corner),
            )?;
            rings.extend(walk.rings);
            corner = walk.last;
        }

        self.row.push(PlacedTile {
            x,
            width: tile.width(),
            height: tile.height(),
            right,
            bottom,
            corner,
        });
        self.x_offset += tile.width() as i64 + 1;
        self.emit(rings)
    }

    /// Closes the current row; the next tile starts a new row below it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::EmptyRow` if no tile was added since the
    /// last call, or `ConfigurationError::RowTileCount` if the row holds a
    /// different number of tiles than the row above.
    #[allow(clippy::cast_possible_wrap)]
    pub fn add_new_row(&mut self) -> Result<()> {
        let Some(first) = self.row.first() else {
            return Err(ConfigurationError::EmptyRow.into());
        };
        if let Some(north) = &self.north {
            if north.len() != self.row.len() {
                return Err(ConfigurationError::RowTileCount {
                    expected: north.len(),
                    actual: self.row.len(),
                }
                .into());
            }
        }
        let height = first.height;
        debug!(
            tiles = self.row.len(),
            y = self.y_offset,
            open_chains = self.graph.chain_count(),
            "finished row"
        );
        self.north = Some(std::mem::take(&mut self.row));
        self.x_offset = self.origin_x;
        self.y_offset += height as i64 + 1;
        Ok(())
    }

    fn emit(&mut self, rings: Vec<ClosedRing>) -> Result<()> {
        for ring in rings {
            trace!(
                vertices = ring.vertex_count(),
                area = ring.signed_area(),
                "closed ring"
            );
            let feature = self.factory.create(ring)?;
            self.features.push(feature);
        }
        Ok(())
    }

    /// Features whose rings have closed so far.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Removes and returns the features closed so far.
    pub fn take_features(&mut self) -> Vec<Feature> {
        std::mem::take(&mut self.features)
    }

    /// Number of chains still waiting for a neighbouring tile.
    #[must_use]
    pub fn open_chain_count(&self) -> usize {
        self.graph.chain_count()
    }

    /// Number of points held by open chains.
    #[must_use]
    pub fn open_point_count(&self) -> usize {
        self.graph.point_count()
    }

    /// Pixel offset where the next tile will be placed.
    #[must_use]
    pub fn offset(&self) -> (i64, i64) {
        (self.x_offset, self.y_offset)
    }

    /// Consumes the stitcher and returns every closed feature.
    #[must_use]
    pub fn finish(self) -> Vec<Feature> {
        self.features
    }
}

/// The tile above `column`, checked against the incoming tile.
fn north_of<'a>(
    row: Option<&'a [PlacedTile]>,
    column: usize,
    tile: &Tile,
) -> Result<Option<&'a PlacedTile>> {
    let Some(row) = row else {
        return Ok(None);
    };
    let north = row.get(column).ok_or(ConfigurationError::RowTileCount {
        expected: row.len(),
        actual: column + 1,
    })?;
    if north.width != tile.width() {
        return Err(ConfigurationError::SeamLengthMismatch {
            kind: SeamKind::NorthSouth,
            first: north.width,
            second: tile.width(),
        }
        .into());
    }
    Ok(Some(north))
}

use tracing::debug;

use super::classification::{Classification, Side};
use super::table::Segment;
use super::tile::Tile;
use crate::error::{InvariantViolation, Result};
use crate::topology::{ClosedRing, PointGraph, PointId, Visit};

/// One boundary side of a tile.
///
/// The classifications at both ends are kept so a later stitch can rebuild
/// the seam cell; `point` is present iff a contour crosses the side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenEdge {
    pub point: Option<PointId>,
    pub side: Side,
    /// Ordered along the boundary: left to right, or top to bottom.
    pub classes: [Classification; 2],
}

impl OpenEdge {
    /// Whether a contour crosses this side.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.point.is_some()
    }
}

/// The four boundary lists of a traced tile, each ordered along its edge.
#[derive(Debug, Clone, Default)]
pub struct OpenEdges {
    pub top: Vec<OpenEdge>,
    pub right: Vec<OpenEdge>,
    pub bottom: Vec<OpenEdge>,
    pub left: Vec<OpenEdge>,
}

impl OpenEdges {
    #[must_use]
    pub fn get(&self, side: Side) -> &[OpenEdge] {
        match side {
            Side::Top => &self.top,
            Side::Right => &self.right,
            Side::Bottom => &self.bottom,
            Side::Left => &self.left,
        }
    }

    /// Number of boundary sides a contour crosses, over all four lists.
    #[must_use]
    pub fn open_count(&self) -> usize {
        Side::ALL
            .iter()
            .map(|&side| self.get(side).iter().filter(|e| e.is_open()).count())
            .sum()
    }
}

/// What tracing one tile produced.
#[derive(Debug)]
pub struct TracedTile {
    /// Rings that closed entirely inside the tile.
    pub rings: Vec<ClosedRing>,
    pub edges: OpenEdges,
}

/// Links the segments of one tile into chains.
pub struct TileTracer<'a> {
    tile: &'a Tile,
}

/// Start and end points of every segment, flattened over cells.
struct SegmentPoints {
    /// Index into `ends` of each cell's first segment.
    offsets: Vec<usize>,
    ends: Vec<(PointId, PointId)>,
}

impl<'a> TileTracer<'a> {
    /// Creates a new `TileTracer` for the given tile.
    #[must_use]
    pub fn new(tile: &'a Tile) -> Self {
        Self { tile }
    }

    /// Traces the tile into `graph`, placing its NW pixel at `origin`.
    ///
    /// Every segment end becomes a point. Chains are grown in one row-major
    /// pass: from each unvisited segment the walk follows the contour
    /// forward through neighbouring cells until it either returns to its
    /// head (the ring closes) or reaches the tile boundary, after which it
    /// walks backward from the head to the boundary on the other side.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation::UnmatchedSegment` if a segment ends on an
    /// interior side that no neighbouring segment continues from.
    pub fn trace(&self, graph: &mut PointGraph, origin: (i64, i64)) -> Result<TracedTile> {
        let points = self.place_points(graph, origin);
        let mut rings = Vec::new();

        for cy in 0..self.tile.height() {
            for cx in 0..self.tile.width() {
                for k in 0..self.tile.cell(cx, cy).len() {
                    let (start, _) = points.get(self.index(cx, cy), k);
                    // Points of a ring that already closed have left the graph.
                    if graph
                        .point(start)
                        .is_ok_and(|p| p.visit == Visit::Unvisited)
                    {
                        if let Some(ring) = self.walk(graph, &points, cx, cy, k)? {
                            rings.push(ring);
                        }
                    }
                }
            }
        }

        let edges = self.boundary(&points);
        debug!(
            width = self.tile.width(),
            height = self.tile.height(),
            origin_x = origin.0,
            origin_y = origin.1,
            closed = rings.len(),
            open = edges.open_count(),
            "traced tile"
        );
        Ok(TracedTile { rings, edges })
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    fn place_points(&self, graph: &mut PointGraph, origin: (i64, i64)) -> SegmentPoints {
        let cells = self.tile.isoband();
        let mut offsets = Vec::with_capacity(cells.len());
        let mut ends = Vec::with_capacity(self.tile.segment_count());
        for cy in 0..self.tile.height() {
            for cx in 0..self.tile.width() {
                offsets.push(ends.len());
                let x0 = (origin.0 + cx as i64) as f64;
                let y0 = (origin.1 + cy as i64) as f64;
                for segment in self.tile.cell(cx, cy).iter() {
                    let start = graph.add_point(segment.start.midpoint(x0, y0), segment.start);
                    let end = graph.add_point(segment.end.midpoint(x0, y0), segment.end);
                    ends.push((start, end));
                }
            }
        }
        SegmentPoints { offsets, ends }
    }

    fn index(&self, cx: usize, cy: usize) -> usize {
        cy * self.tile.width() + cx
    }

    /// The cell across `side` of `(cx, cy)`, if it lies inside the tile.
    fn neighbor(&self, cx: usize, cy: usize, side: Side) -> Option<(usize, usize)> {
        match side {
            Side::Top => cy.checked_sub(1).map(|y| (cx, y)),
            Side::Right => (cx + 1 < self.tile.width()).then_some((cx + 1, cy)),
            Side::Bottom => (cy + 1 < self.tile.height()).then_some((cx, cy + 1)),
            Side::Left => cx.checked_sub(1).map(|x| (x, cy)),
        }
    }

    /// Finds the segment of cell `(cx, cy)` with an end on `side`.
    fn find(
        &self,
        cx: usize,
        cy: usize,
        side: Side,
        pick: fn(&Segment) -> Side,
    ) -> Result<(usize, Segment)> {
        self.tile
            .cell(cx, cy)
            .iter()
            .enumerate()
            .find(|(_, s)| pick(s) == side)
            .map(|(k, s)| (k, *s))
            .ok_or_else(|| {
                InvariantViolation::UnmatchedSegment {
                    column: cx,
                    row: cy,
                    side,
                }
                .into()
            })
    }

    fn walk(
        &self,
        graph: &mut PointGraph,
        points: &SegmentPoints,
        cx: usize,
        cy: usize,
        k: usize,
    ) -> Result<Option<ClosedRing>> {
        let first = self.tile.cell(cx, cy).as_slice()[k];
        let (head, mut tail) = points.get(self.index(cx, cy), k);
        graph.start_segment(head, tail)?;

        // Forward, following segment ends.
        let (mut x, mut y, mut side) = (cx, cy, first.end);
        while let Some((nx, ny)) = self.neighbor(x, y, side) {
            let (nk, next) = self.find(nx, ny, side.opposite(), |s| s.start)?;
            let (start, end) = points.get(self.index(nx, ny), nk);
            if start == head {
                return graph.join(tail, head);
            }
            graph.start_segment(start, end)?;
            graph.join(tail, start)?;
            tail = end;
            (x, y, side) = (nx, ny, next.end);
        }

        // Backward, following segment starts.
        let mut head = head;
        let (mut x, mut y, mut side) = (cx, cy, first.start);
        while let Some((nx, ny)) = self.neighbor(x, y, side) {
            let (nk, prev) = self.find(nx, ny, side.opposite(), |s| s.end)?;
            let (start, end) = points.get(self.index(nx, ny), nk);
            graph.start_segment(start, end)?;
            graph.join(end, head)?;
            head = start;
            (x, y, side) = (nx, ny, prev.start);
        }
        Ok(None)
    }

    /// Reads the four boundary lists off the edge cells.
    fn boundary(&self, points: &SegmentPoints) -> OpenEdges {
        let (w, h) = (self.tile.width(), self.tile.height());
        let sample = |cx: usize, cy: usize, side: Side| OpenEdge {
            point: self.point_on(points, cx, cy, side),
            side,
            classes: self.tile.side_classes(cx, cy, side),
        };
        OpenEdges {
            top: (0..w).map(|cx| sample(cx, 0, Side::Top)).collect(),
            right: (0..h).map(|cy| sample(w - 1, cy, Side::Right)).collect(),
            bottom: (0..w).map(|cx| sample(cx, h - 1, Side::Bottom)).collect(),
            left: (0..h).map(|cy| sample(0, cy, Side::Left)).collect(),
        }
    }

    fn point_on(&self, points: &SegmentPoints, cx: usize, cy: usize, side: Side) -> Option<PointId> {
        let cell = self.index(cx, cy);
        self.tile
            .cell(cx, cy)
            .iter()
            .enumerate()
            .find_map(|(k, s)| {
                let (start, end) = points.get(cell, k);
                if s.start == side {
                    Some(start)
                } else if s.end == side {
                    Some(end)
                } else {
                    None
                }
            })
    }
}

impl SegmentPoints {
    fn get(&self, cell: usize, k: usize) -> (PointId, PointId) {
        self.ends[self.offsets[cell] + k]
    }
}

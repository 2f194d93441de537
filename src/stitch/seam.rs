use tracing::debug;

use crate::error::{ConfigurationError, InvariantViolation, Result, SeamKind};
use crate::isoband::{Classification, ContourTable, OpenEdge, Side};
use crate::topology::{ClosedRing, PointGraph, PointId};

/// What one seam walk produced.
#[derive(Debug, Default)]
pub(crate) struct SeamWalk {
    pub rings: Vec<ClosedRing>,
    /// Point on the along-seam side before the first cell, if crossed.
    pub first: Option<PointId>,
    /// Point on the along-seam side after the last cell, if crossed.
    pub last: Option<PointId>,
}

impl SeamKind {
    /// Sides of a seam cell that face the two tiles, nearer tile first.
    const fn facing(self) -> [Side; 2] {
        match self {
            Self::NorthSouth => [Side::Top, Side::Bottom],
            Self::WestEast => [Side::Left, Side::Right],
        }
    }

    /// Sides shared with the previous and the next seam cell.
    const fn along(self) -> [Side; 2] {
        match self {
            Self::NorthSouth => [Side::Left, Side::Right],
            Self::WestEast => [Side::Top, Side::Bottom],
        }
    }

    const fn step(self) -> (i64, i64) {
        match self {
            Self::NorthSouth => (1, 0),
            Self::WestEast => (0, 1),
        }
    }

    /// Rebuilds NW, NE, SE, SW from the boundary classes of both tiles.
    const fn corners(self, near: [Classification; 2], far: [Classification; 2]) -> [Classification; 4] {
        match self {
            // near: bottom of the north tile, far: top of the south tile.
            Self::NorthSouth => [near[0], near[1], far[1], far[0]],
            // near: right of the west tile, far: left of the east tile.
            Self::WestEast => [near[0], far[0], far[1], near[1]],
        }
    }
}

/// Contours the one-cell gap between two tiles.
///
/// `near` and `far` are the facing boundary lists of the two tiles, ordered
/// along the seam; cell `k` has its NW pixel at `origin` advanced `k` steps
/// along the seam. The sides facing the tiles reuse the points the tracer
/// recorded; the sides between consecutive seam cells get fresh points,
/// starting from `carry` for the first cell.
///
/// # Errors
///
/// Returns `ConfigurationError::SeamLengthMismatch` if the lists differ in
/// length, `InvariantViolation::MissingSeamPoint` if a crossed tile side has
/// no recorded point, and any linking failure from the graph.
#[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
pub(crate) fn walk(
    graph: &mut PointGraph,
    kind: SeamKind,
    near: &[OpenEdge],
    far: &[OpenEdge],
    origin: (i64, i64),
    carry: Option<PointId>,
) -> Result<SeamWalk> {
    if near.len() != far.len() {
        return Err(ConfigurationError::SeamLengthMismatch {
            kind,
            first: near.len(),
            second: far.len(),
        }
        .into());
    }

    let [before, after] = kind.along();
    let (dx, dy) = kind.step();
    let mut out = SeamWalk {
        first: carry,
        ..SeamWalk::default()
    };
    let mut carry = carry;

    for (k, (a, b)) in near.iter().zip(far).enumerate() {
        let x0 = (origin.0 + dx * k as i64) as f64;
        let y0 = (origin.1 + dy * k as i64) as f64;
        let mut cell = SeamCell {
            facing: kind.facing(),
            x0,
            y0,
            points: {
                let mut points = [None; 4];
                let [n, f] = kind.facing();
                points[n.index()] = a.point;
                points[f.index()] = b.point;
                points[before.index()] = carry;
                points
            },
        };
        for segment in ContourTable::lookup(kind.corners(a.classes, b.classes)).iter() {
            let from = cell.resolve(graph, segment.start)?;
            let to = cell.resolve(graph, segment.end)?;
            if let Some(ring) = graph.stitch(from, to)? {
                out.rings.push(ring);
            }
        }
        if k == 0 {
            out.first = cell.points[before.index()];
        }
        carry = cell.points[after.index()];
    }
    out.last = carry;

    debug!(
        kind = ?kind,
        cells = near.len(),
        closed = out.rings.len(),
        "stitched seam"
    );
    Ok(out)
}

/// Side points of one seam cell while its segments are linked.
struct SeamCell {
    facing: [Side; 2],
    x0: f64,
    y0: f64,
    points: [Option<PointId>; 4],
}

impl SeamCell {
    fn resolve(&mut self, graph: &mut PointGraph, side: Side) -> Result<PointId> {
        if let Some(id) = self.points[side.index()] {
            return Ok(id);
        }
        let position = side.midpoint(self.x0, self.y0);
        if self.facing.contains(&side) {
            return Err(InvariantViolation::MissingSeamPoint {
                x: position.x,
                y: position.y,
                side,
            }
            .into());
        }
        let id = graph.add_open_point(position, side);
        self.points[side.index()] = Some(id);
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ContourError;
    use crate::isoband::Classification::{Above, Below};

    fn edge(side: Side, classes: [Classification; 2]) -> OpenEdge {
        OpenEdge {
            point: None,
            side,
            classes,
        }
    }

    #[test]
    fn lists_of_different_length_are_rejected() {
        let mut graph = PointGraph::new();
        let near = [edge(Side::Bottom, [Below, Below])];
        let far = [
            edge(Side::Top, [Below, Below]),
            edge(Side::Top, [Below, Below]),
        ];
        let err = walk(&mut graph, SeamKind::NorthSouth, &near, &far, (0, 0), None).unwrap_err();
        assert!(matches!(
            err,
            ContourError::Configuration(ConfigurationError::SeamLengthMismatch {
                kind: SeamKind::NorthSouth,
                first: 1,
                second: 2,
            })
        ));
    }

    #[test]
    fn uncrossed_seam_adds_nothing() {
        let mut graph = PointGraph::new();
        let near = vec![edge(Side::Right, [Below, Below]); 3];
        let far = vec![edge(Side::Left, [Below, Below]); 3];
        let out = walk(&mut graph, SeamKind::WestEast, &near, &far, (4, 0), None).unwrap();
        assert!(out.rings.is_empty());
        assert!(out.first.is_none() && out.last.is_none());
        assert_eq!(graph.point_count(), 0);
    }

    #[test]
    fn crossed_tile_side_without_point_is_an_invariant_violation() {
        let mut graph = PointGraph::new();
        // The east tile's left side is crossed but no point was recorded.
        let near = [edge(Side::Right, [Below, Below])];
        let far = [edge(Side::Left, [Above, Below])];
        let err = walk(&mut graph, SeamKind::WestEast, &near, &far, (2, 0), None).unwrap_err();
        assert!(matches!(
            err,
            ContourError::Invariant(InvariantViolation::MissingSeamPoint { .. })
        ));
    }

    #[test]
    fn along_seam_sides_chain_through_fresh_points() {
        let mut graph = PointGraph::new();
        // Only the SW corner of the first cell is inside.
        let near = [edge(Side::Bottom, [Below, Below]), edge(Side::Bottom, [Below, Below])];
        let far_point = graph.add_open_point(crate::math::Point2::new(0.5, 1.0), Side::Top);
        let far = [
            OpenEdge {
                point: Some(far_point),
                side: Side::Top,
                classes: [Above, Below],
            },
            edge(Side::Top, [Below, Below]),
        ];
        let out = walk(&mut graph, SeamKind::NorthSouth, &near, &far, (0, 0), None).unwrap();
        assert!(out.first.is_some());
        assert!(out.last.is_none());
        assert_eq!(graph.chain_count(), 1);
        let first = graph.position(out.first.unwrap()).unwrap();
        assert!((first.x - 0.0).abs() < crate::math::TOLERANCE);
        assert!((first.y - 0.5).abs() < crate::math::TOLERANCE);
    }
}

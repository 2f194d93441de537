use crate::isoband::Side;
use crate::math::Point2;

use super::chain::ChainId;

slotmap::new_key_type! {
    /// Unique identifier for a contour point in the point graph.
    pub struct PointId;
}

/// How far a point has progressed through tracing and stitching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Created for a segment end, not yet part of a chain.
    Unvisited,
    /// Collected into a chain by the tile tracer or a seam.
    Collected,
    /// Linked across a seam between tiles.
    Stitched,
}

/// Data associated with a contour point.
///
/// Every point has one inbound and one outbound link slot. A point inside a
/// chain has both slots committed; the free ends of an open chain each have
/// one slot open.
#[derive(Debug, Clone)]
pub struct PointData {
    /// Position in the global raster frame.
    pub position: Point2,
    /// The cell side the point was generated on.
    pub side: Side,
    pub visit: Visit,
    /// Inbound link.
    pub prev: Option<PointId>,
    /// Outbound link.
    pub next: Option<PointId>,
    /// Owning chain, once collected.
    pub chain: Option<ChainId>,
}

impl PointData {
    /// Creates an unlinked, unvisited point.
    #[must_use]
    pub fn new(position: Point2, side: Side) -> Self {
        Self {
            position,
            side,
            visit: Visit::Unvisited,
            prev: None,
            next: None,
            chain: None,
        }
    }

    /// Number of committed link slots.
    #[must_use]
    pub fn link_count(&self) -> usize {
        usize::from(self.prev.is_some()) + usize::from(self.next.is_some())
    }
}

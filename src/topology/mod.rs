pub mod chain;
pub mod point;

pub use chain::{Chain, ChainId, ClosedRing};
pub use point::{PointData, PointId, Visit};

use slotmap::SlotMap;

use crate::error::{InvariantViolation, LinkSlot, Result};
use crate::isoband::Side;
use crate::math::Point2;

/// Central arena that owns all open contour points and chains.
///
/// Points and chains reference each other via typed IDs (generational
/// indices), so the cyclic point graph needs no shared ownership. A chain
/// that closes is removed together with its points and handed back as a
/// [`ClosedRing`]; the arena only ever holds the open contour frontier.
#[derive(Debug, Default)]
pub struct PointGraph {
    points: SlotMap<PointId, PointData>,
    chains: SlotMap<ChainId, Chain>,
    simplify: bool,
}

impl PointGraph {
    /// Creates a new, empty point graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes closed rings drop collinear vertices.
    #[must_use]
    pub fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }

    // --- Point operations ---

    /// Inserts an unvisited, unlinked point and returns its ID.
    pub fn add_point(&mut self, position: Point2, side: Side) -> PointId {
        self.points.insert(PointData::new(position, side))
    }

    /// Inserts a point that starts its own single-point chain.
    pub fn add_open_point(&mut self, position: Point2, side: Side) -> PointId {
        let id = self.points.insert(PointData::new(position, side));
        let chain = self.chains.insert(Chain {
            points: [id].into_iter().collect(),
        });
        if let Some(point) = self.points.get_mut(id) {
            point.chain = Some(chain);
            point.visit = Visit::Collected;
        }
        id
    }

    /// Returns a reference to the point data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation::UnknownPoint` if the point is not in the graph.
    pub fn point(&self, id: PointId) -> Result<&PointData> {
        self.points
            .get(id)
            .ok_or_else(|| InvariantViolation::UnknownPoint.into())
    }

    fn point_mut(&mut self, id: PointId) -> Result<&mut PointData> {
        self.points
            .get_mut(id)
            .ok_or_else(|| InvariantViolation::UnknownPoint.into())
    }

    /// Position of a point.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation::UnknownPoint` if the point is not in the graph.
    pub fn position(&self, id: PointId) -> Result<Point2> {
        Ok(self.point(id)?.position)
    }

    /// Number of points still held by open chains (or not yet collected).
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    // --- Chain operations ---

    /// Number of chains that are still open.
    #[must_use]
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Iterates over the open chains.
    pub fn chains(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chains.iter()
    }

    /// Starts a chain from one cell segment, linking `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation::AlreadyCollected` if either point is
    /// already part of a chain.
    pub fn start_segment(&mut self, start: PointId, end: PointId) -> Result<ChainId> {
        for id in [start, end] {
            let point = self.point(id)?;
            if point.visit != Visit::Unvisited || point.chain.is_some() {
                let p = point.position;
                return Err(InvariantViolation::AlreadyCollected { x: p.x, y: p.y }.into());
            }
        }
        let chain = self.chains.insert(Chain {
            points: [start, end].into_iter().collect(),
        });
        let s = self.point_mut(start)?;
        s.visit = Visit::Collected;
        s.chain = Some(chain);
        s.next = Some(end);
        let e = self.point_mut(end)?;
        e.visit = Visit::Collected;
        e.chain = Some(chain);
        e.prev = Some(start);
        Ok(chain)
    }

    /// Links two chain ends found by tracing inside a single tile.
    ///
    /// # Errors
    ///
    /// See [`PointGraph::stitch`].
    pub fn join(&mut self, from: PointId, to: PointId) -> Result<Option<ClosedRing>> {
        self.link(from, to, Visit::Collected)
    }

    /// Links two chain ends across a seam; both points become `Stitched`.
    ///
    /// `from` must be the tail of its chain (outbound slot open) and `to` the
    /// head of its chain (inbound slot open). Linking a chain's tail to its
    /// own head closes it: the chain and its points leave the graph and the
    /// ring is returned.
    ///
    /// # Errors
    ///
    /// Returns an `InvariantViolation` if either slot is already committed or
    /// either point is not a free end of a chain.
    pub fn stitch(&mut self, from: PointId, to: PointId) -> Result<Option<ClosedRing>> {
        self.link(from, to, Visit::Stitched)
    }

    fn link(&mut self, from: PointId, to: PointId, visit: Visit) -> Result<Option<ClosedRing>> {
        let (from_chain, from_pos) = {
            let p = self.point(from)?;
            if p.next.is_some() {
                return Err(slot_committed(LinkSlot::Outbound, p.position));
            }
            (p.chain, p.position)
        };
        let (to_chain, to_pos) = {
            let p = self.point(to)?;
            if p.prev.is_some() {
                return Err(slot_committed(LinkSlot::Inbound, p.position));
            }
            (p.chain, p.position)
        };
        let from_chain = from_chain.ok_or(InvariantViolation::DetachedPoint {
            x: from_pos.x,
            y: from_pos.y,
        })?;
        let to_chain = to_chain.ok_or(InvariantViolation::DetachedPoint {
            x: to_pos.x,
            y: to_pos.y,
        })?;
        if self.chains.get(from_chain).and_then(Chain::tail) != Some(from) {
            return Err(not_chain_end(from_pos));
        }
        if self.chains.get(to_chain).and_then(Chain::head) != Some(to) {
            return Err(not_chain_end(to_pos));
        }

        let f = self.point_mut(from)?;
        f.next = Some(to);
        f.visit = merge_visit(f.visit, visit);
        let t = self.point_mut(to)?;
        t.prev = Some(from);
        t.visit = merge_visit(t.visit, visit);

        if from_chain == to_chain {
            return self.close(from_chain).map(Some);
        }
        self.merge(from_chain, to_chain);
        Ok(None)
    }

    /// Appends chain `second` after chain `first`, relabelling the shorter one.
    fn merge(&mut self, first: ChainId, second: ChainId) {
        let first_len = self.chains.get(first).map_or(0, Chain::len);
        let second_len = self.chains.get(second).map_or(0, Chain::len);
        if first_len >= second_len {
            let Some(moved) = self.chains.remove(second) else {
                return;
            };
            for &id in &moved.points {
                if let Some(p) = self.points.get_mut(id) {
                    p.chain = Some(first);
                }
            }
            if let Some(target) = self.chains.get_mut(first) {
                target.points.extend(moved.points);
            }
        } else {
            let Some(moved) = self.chains.remove(first) else {
                return;
            };
            for &id in &moved.points {
                if let Some(p) = self.points.get_mut(id) {
                    p.chain = Some(second);
                }
            }
            if let Some(target) = self.chains.get_mut(second) {
                for id in moved.points.into_iter().rev() {
                    target.points.push_front(id);
                }
            }
        }
    }

    /// Removes a closed chain and its points, returning the ring.
    fn close(&mut self, chain: ChainId) -> Result<ClosedRing> {
        let chain = self
            .chains
            .remove(chain)
            .ok_or(InvariantViolation::UnknownPoint)?;
        let mut positions = Vec::with_capacity(chain.len());
        for id in chain.points {
            let point = self.points.remove(id).ok_or(InvariantViolation::UnknownPoint)?;
            positions.push(point.position);
        }
        Ok(ClosedRing::from_positions(&positions, self.simplify))
    }
}

fn merge_visit(current: Visit, incoming: Visit) -> Visit {
    if current == Visit::Stitched {
        Visit::Stitched
    } else {
        incoming
    }
}

fn slot_committed(slot: LinkSlot, at: Point2) -> crate::error::ContourError {
    InvariantViolation::SlotCommitted {
        slot,
        x: at.x,
        y: at.y,
    }
    .into()
}

fn not_chain_end(at: Point2) -> crate::error::ContourError {
    InvariantViolation::NotChainEnd { x: at.x, y: at.y }.into()
}

use std::collections::VecDeque;

use crate::math::polygon_2d::drop_collinear;
use crate::math::{signed_area, Point2, Winding, TOLERANCE};

use super::point::PointId;

slotmap::new_key_type! {
    /// Unique identifier for an open chain in the point graph.
    pub struct ChainId;
}

/// A polygon under construction: points in link order, head first.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    pub points: VecDeque<PointId>,
}

impl Chain {
    #[must_use]
    pub fn head(&self) -> Option<PointId> {
        self.points.front().copied()
    }

    #[must_use]
    pub fn tail(&self) -> Option<PointId> {
        self.points.back().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A chain whose tail was linked back to its head.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedRing {
    /// Ring vertices with coincident neighbours merged; the first point is
    /// repeated at the end.
    pub points: Vec<Point2>,
    /// Number of graph points the chain held before merging.
    pub chain_len: usize,
}

impl ClosedRing {
    /// Builds a ring from chain positions in link order.
    #[must_use]
    pub fn from_positions(positions: &[Point2], simplify: bool) -> Self {
        let mut points: Vec<Point2> = Vec::with_capacity(positions.len() + 1);
        for &p in positions {
            if points.last().is_some_and(|q| coincident(q, &p)) {
                continue;
            }
            points.push(p);
        }
        while points.len() > 1 && points.first().zip(points.last()).is_some_and(|(a, b)| coincident(a, b)) {
            points.pop();
        }
        if simplify {
            points = drop_collinear(&points);
        }
        if let Some(&first) = points.first() {
            points.push(first);
        }
        Self {
            points,
            chain_len: positions.len(),
        }
    }

    /// Number of distinct vertices (the closing repeat is not counted).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    #[must_use]
    pub fn winding(&self) -> Winding {
        Winding::of_area(self.signed_area())
    }
}

fn coincident(a: &Point2, b: &Point2) -> bool {
    (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE
}

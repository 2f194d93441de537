use tracing::{info, warn};

use super::index::{RTreeIndex, SpatialIndex};
use crate::error::Result;
use crate::feature::Feature;
use crate::math::{point_in_ring, Aabb, Winding};

/// Result of nesting a set of features.
#[derive(Debug, Default)]
pub struct NestOutcome {
    /// Outer rings, each carrying the holes assigned to it.
    pub features: Vec<Feature>,
    /// Hole rings that no outer ring encloses.
    pub orphans: Vec<Feature>,
    /// Rings dropped for having zero area.
    pub degenerate: usize,
}

/// Assigns hole rings to the outer ring that directly encloses them.
///
/// Rings are told apart by winding: counter-clockwise rings are outers,
/// clockwise rings are holes. Candidate outers come from a [`SpatialIndex`]
/// over their bounding boxes, tried smallest box first; the first one whose
/// ring contains the hole's first vertex wins. Contour rings never cross, so
/// the smallest enclosing outer is the direct parent.
#[derive(Debug)]
pub struct PolygonNester<I = RTreeIndex> {
    index: I,
}

impl Default for PolygonNester<RTreeIndex> {
    fn default() -> Self {
        Self::new(RTreeIndex::new())
    }
}

impl<I: SpatialIndex> PolygonNester<I> {
    #[must_use]
    pub fn new(index: I) -> Self {
        Self { index }
    }

    /// Partitions `features` into outers with holes attached.
    ///
    /// # Errors
    ///
    /// Only the spatial index can fail; its error is passed through.
    pub fn nest(mut self, features: Vec<Feature>) -> Result<NestOutcome> {
        let mut outers = Vec::new();
        let mut holes = Vec::new();
        let mut degenerate = 0;
        for feature in features {
            match feature.winding() {
                Winding::CounterClockwise => outers.push(feature),
                Winding::Clockwise => holes.push(feature),
                Winding::Degenerate => degenerate += 1,
            }
        }

        let boxes: Vec<Option<Aabb>> = outers.iter().map(Feature::bbox).collect();
        for (i, bbox) in boxes.iter().enumerate() {
            if let Some(bbox) = bbox {
                self.index.insert(*bbox, i)?;
            }
        }
        let area = |i: usize| boxes.get(i).copied().flatten().map_or(f64::INFINITY, |b| b.area());

        let mut orphans = Vec::new();
        let hole_count = holes.len();
        for hole in holes {
            let (Some(bbox), Some(probe)) = (hole.bbox(), hole.points.first().copied()) else {
                orphans.push(hole);
                continue;
            };
            let mut candidates = self.index.query_enclosing(&bbox)?;
            candidates.sort_by(|&a, &b| area(a).total_cmp(&area(b)).then(a.cmp(&b)));
            let host = candidates
                .into_iter()
                .find(|&i| outers.get(i).is_some_and(|outer| point_in_ring(&probe, &outer.points)));
            match host.and_then(|i| outers.get_mut(i)) {
                Some(outer) => outer.holes.push(hole.points),
                None => {
                    warn!(x = probe.x, y = probe.y, "hole has no enclosing polygon");
                    orphans.push(hole);
                }
            }
        }

        info!(
            outers = outers.len(),
            holes = hole_count - orphans.len(),
            orphans = orphans.len(),
            degenerate,
            "nested polygons"
        );
        Ok(NestOutcome {
            features: outers,
            orphans,
            degenerate,
        })
    }
}

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::RTree;

use crate::error::Result;
use crate::math::Aabb;

/// Answers "which inserted boxes contain this box" for the nester.
pub trait SpatialIndex {
    /// Stores `bbox` under `value`.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures as
    /// [`ContourError::External`](crate::error::ContourError::External).
    fn insert(&mut self, bbox: Aabb, value: usize) -> Result<()>;

    /// Values of every stored box that contains `bbox`, in no particular order.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures as
    /// [`ContourError::External`](crate::error::ContourError::External).
    fn query_enclosing(&self, bbox: &Aabb) -> Result<Vec<usize>>;
}

type Entry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// [`SpatialIndex`] backed by an R*-tree.
#[derive(Debug, Default)]
pub struct RTreeIndex {
    tree: RTree<Entry>,
    /// Boxes and values by insertion slot; the tree stores the slot.
    boxes: Vec<(Aabb, usize)>,
}

impl RTreeIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl SpatialIndex for RTreeIndex {
    fn insert(&mut self, bbox: Aabb, value: usize) -> Result<()> {
        let rect = Rectangle::from_corners([bbox.min.x, bbox.min.y], [bbox.max.x, bbox.max.y]);
        self.tree.insert(GeomWithData::new(rect, self.boxes.len()));
        self.boxes.push((bbox, value));
        Ok(())
    }

    fn query_enclosing(&self, bbox: &Aabb) -> Result<Vec<usize>> {
        // Any enclosing box contains the query's min corner.
        Ok(self
            .tree
            .locate_all_at_point(&[bbox.min.x, bbox.min.y])
            .filter_map(|entry| self.boxes.get(entry.data))
            .filter(|(outer, _)| outer.contains(bbox))
            .map(|&(_, value)| value)
            .collect())
    }
}

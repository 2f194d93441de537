use serde_json::{Map, Value};

use crate::error::Result;
use crate::math::{signed_area, Aabb, Point2, Vector2, Winding};
use crate::topology::ClosedRing;

/// A finished polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Exterior ring; the first point is repeated at the end.
    pub points: Vec<Point2>,
    /// Free-form properties stamped by a [`FeatureFactory`].
    pub properties: Map<String, Value>,
    /// Interior rings, each closed like `points`.
    pub holes: Vec<Vec<Point2>>,
}

impl Feature {
    /// Creates a feature without properties or holes.
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
        Self {
            points,
            properties: Map::new(),
            holes: Vec::new(),
        }
    }

    /// Number of distinct exterior vertices.
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

    #[must_use]
    pub fn bbox(&self) -> Option<Aabb> {
        Aabb::from_points(&self.points)
    }

    /// Moves every point, holes included, by `offset`.
    pub fn translate(&mut self, offset: Vector2) {
        for p in self.points.iter_mut().chain(self.holes.iter_mut().flatten()) {
            *p += offset;
        }
    }

    /// Reads a property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Turns closed rings into features and may stamp properties on them.
pub trait FeatureFactory {
    /// Creates a feature from a closed ring.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures as
    /// [`ContourError::External`](crate::error::ContourError::External).
    fn create(&mut self, ring: ClosedRing) -> Result<Feature>;
}

/// Stamps an increasing integer identifier on every feature.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    property: String,
    next: u64,
}

impl SequentialIds {
    /// Creates a factory writing ids under `property`, starting at 0.
    #[must_use]
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            next: 0,
        }
    }

    /// The id the next feature will receive.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl FeatureFactory for SequentialIds {
    fn create(&mut self, ring: ClosedRing) -> Result<Feature> {
        let mut feature = Feature::new(ring.points);
        feature
            .properties
            .insert(self.property.clone(), Value::from(self.next));
        self.next += 1;
        Ok(feature)
    }
}

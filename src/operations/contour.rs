use tracing::info;

use crate::error::Result;
use crate::feature::SequentialIds;
use crate::nesting::{NestOutcome, PolygonNester, RTreeIndex};
use crate::params::ContourParams;
use crate::source::{RasterEvent, RasterSource};
use crate::stitch::BorderGuard;

/// Contours a whole tile stream into nested polygons.
///
/// Tiles are stitched inside a [`BorderGuard`], ids are stamped by
/// [`SequentialIds`] and holes are assigned with an R*-tree backed
/// [`PolygonNester`].
pub struct ContourRaster {
    params: ContourParams,
}

impl ContourRaster {
    #[must_use]
    pub fn new(params: ContourParams) -> Self {
        Self { params }
    }

    /// Consumes `source` and returns the nested polygons.
    ///
    /// # Errors
    ///
    /// Returns the first error from the source unchanged, any
    /// `ConfigurationError` from tiles that do not line up, and any
    /// `InvariantViolation` raised while stitching.
    pub fn execute(&self, source: impl RasterSource) -> Result<NestOutcome> {
        let mut guard = BorderGuard::with_factory(SequentialIds::new(self.params.id_property.clone()))
            .with_params(&self.params);
        let mut tiles = 0usize;
        for event in source {
            match event? {
                RasterEvent::Tile(tile) => {
                    guard.add_east(tile)?;
                    tiles += 1;
                }
                RasterEvent::NewRow => guard.add_new_row()?,
            }
        }
        let features = guard.close()?;
        info!(tiles, features = features.len(), "contoured raster");
        PolygonNester::new(RTreeIndex::new()).nest(features)
    }
}

impl Default for ContourRaster {
    fn default() -> Self {
        Self::new(ContourParams::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ContourError, ValidationError};
    use crate::math::Winding;
    use crate::source::GridSource;
    use serde_json::Value;

    #[rustfmt::skip]
    const RING: [i8; 25] = [
        -1, -1, -1, -1, -1,
        -1,  1,  1,  1, -1,
        -1,  1, -1,  1, -1,
        -1,  1,  1,  1, -1,
        -1, -1, -1, -1, -1,
    ];

    #[test]
    fn ring_becomes_one_polygon_with_one_hole() {
        let source = GridSource::new(5, 5, &RING, 2).unwrap();
        let outcome = ContourRaster::default().execute(source).unwrap();
        assert_eq!(outcome.features.len(), 1);
        assert!(outcome.orphans.is_empty());
        let polygon = &outcome.features[0];
        assert_eq!(polygon.winding(), Winding::CounterClockwise);
        assert_eq!(polygon.holes.len(), 1);
        assert!(polygon.property("id").is_some());
    }

    #[test]
    fn id_property_is_configurable() {
        let params = ContourParams {
            id_property: "fid".to_owned(),
            ..ContourParams::default()
        };
        let source = GridSource::new(5, 5, &RING, 3).unwrap();
        let outcome = ContourRaster::new(params).execute(source).unwrap();
        let ids: Vec<&Value> = outcome
            .features
            .iter()
            .filter_map(|f| f.property("fid"))
            .collect();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn source_errors_stop_the_run() {
        let events: Vec<Result<RasterEvent>> = vec![
            Ok(RasterEvent::Tile(
                crate::isoband::Tile::new(1, 1, &[1, 1, 1, 1]).unwrap(),
            )),
            Err(ValidationError::TileSize(0).into()),
        ];
        let err = ContourRaster::default().execute(events.into_iter()).unwrap_err();
        assert!(matches!(
            err,
            ContourError::Validation(ValidationError::TileSize(0))
        ));
    }
}

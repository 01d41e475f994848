//! GeoJSON export of the published dataset layout.
//!
//! Downstream consumers rely on two collections: crossings
//! `{id, crossing_type, marked}` and street segments
//! `{way_id, name, road_class, distance_to_crossing_m, nearest_crossing_marked}`,
//! both with geometry in geographic coordinates.

use geojson::{Feature, FeatureCollection, Geometry, GeometryValue};
use serde_json::json;

use crate::model::{AnalysisSnapshot, CrossingGeometry};
use crate::{Error, MAX_REPORTED_DISTANCE_M, proj};

impl AnalysisSnapshot {
    /// Converts the crossing set to a GeoJSON `FeatureCollection`.
    pub fn crossings_to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .crossings
            .iter()
            .map(|crossing| {
                let geometry = match &crossing.geometry {
                    CrossingGeometry::Point(point) => {
                        let (lon, lat) = proj::unproject(point.0);
                        Geometry::new(GeometryValue::from(&geo::Point::new(lon, lat)))
                    }
                    CrossingGeometry::Line(line) => {
                        Geometry::new(GeometryValue::from(&proj::unproject_line(line)))
                    }
                };
                let value = json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": {
                        "id": crossing.id,
                        "crossing_type": crossing.crossing_type,
                        "marked": crossing.marked,
                    }
                });
                serde_json::from_value::<Feature>(value)
                    .map_err(|e| Error::GeoJsonError(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    /// Converts the annotated segment set to a GeoJSON
    /// `FeatureCollection`. Distances are clamped to
    /// [`MAX_REPORTED_DISTANCE_M`]; unset distances export as null.
    pub fn segments_to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .segments
            .iter()
            .map(|segment| {
                let geometry =
                    Geometry::new(GeometryValue::from(&proj::unproject_line(&segment.geometry)));
                let value = json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": {
                        "way_id": segment.way_id,
                        "name": segment.name,
                        "road_class": segment.road_class.as_str(),
                        "distance_to_crossing_m": segment
                            .distance_to_crossing_m
                            .map(|d| d.min(MAX_REPORTED_DISTANCE_M)),
                        "nearest_crossing_marked": segment.nearest_crossing_marked,
                    }
                });
                serde_json::from_value::<Feature>(value)
                    .map_err(|e| Error::GeoJsonError(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }
}

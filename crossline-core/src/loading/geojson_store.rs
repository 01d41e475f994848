//! File-backed feature store reading GeoJSON FeatureCollections.

use std::path::Path;

use geojson::{FeatureCollection, GeoJson};
use hashbrown::HashMap;
use log::{info, warn};

use super::{FeatureStore, RawFeature, features_in_envelope};
use crate::Error;

/// Feature store loaded from three GeoJSON files: crossing points,
/// crossing ways, and roads. Features are held in memory; queries
/// filter by bounding box.
#[derive(Debug)]
pub struct GeoJsonStore {
    crossing_points: Vec<RawFeature>,
    crossing_ways: Vec<RawFeature>,
    roads: Vec<RawFeature>,
}

impl GeoJsonStore {
    /// Loads all three collections.
    ///
    /// # Errors
    ///
    /// Fails on unreadable files or top-level JSON that is not a
    /// FeatureCollection. Individual malformed features are skipped
    /// with a warning instead.
    pub fn from_paths(
        crossing_points: &Path,
        crossing_ways: &Path,
        roads: &Path,
    ) -> Result<Self, Error> {
        let store = Self {
            crossing_points: load_collection(crossing_points)?,
            crossing_ways: load_collection(crossing_ways)?,
            roads: load_collection(roads)?,
        };
        info!(
            "loaded {} crossing points, {} crossing ways, {} roads",
            store.crossing_points.len(),
            store.crossing_ways.len(),
            store.roads.len()
        );
        Ok(store)
    }
}

impl FeatureStore for GeoJsonStore {
    fn crossing_points(&self, envelope: geo::Rect<f64>) -> Result<Vec<RawFeature>, Error> {
        Ok(features_in_envelope(&self.crossing_points, envelope))
    }

    fn crossing_ways(&self, envelope: geo::Rect<f64>) -> Result<Vec<RawFeature>, Error> {
        Ok(features_in_envelope(&self.crossing_ways, envelope))
    }

    fn roads(&self, envelope: geo::Rect<f64>) -> Result<Vec<RawFeature>, Error> {
        Ok(features_in_envelope(&self.roads, envelope))
    }
}

fn load_collection(path: &Path) -> Result<Vec<RawFeature>, Error> {
    let text = std::fs::read_to_string(path)?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| Error::GeoJsonError(format!("{}: {e}", path.display())))?;
    let collection = FeatureCollection::try_from(geojson)
        .map_err(|e| Error::GeoJsonError(format!("{}: {e}", path.display())))?;

    let mut features = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            warn!("{}: feature {index} has no geometry, skipping", path.display());
            continue;
        };
        let geometry = match geo::Geometry::<f64>::try_from(geometry.value) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!(
                    "{}: feature {index} has unparseable geometry ({e}), skipping",
                    path.display()
                );
                continue;
            }
        };

        let tags: HashMap<String, String> = feature
            .properties
            .iter()
            .flat_map(|props| props.iter())
            .filter_map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key.clone(), value))
            })
            .collect();

        let id = feature_id(feature.id.as_ref(), &tags).unwrap_or(index as i64);
        features.push(RawFeature { id, geometry, tags });
    }
    Ok(features)
}

fn feature_id(id: Option<&geojson::feature::Id>, tags: &HashMap<String, String>) -> Option<i64> {
    match id {
        Some(geojson::feature::Id::Number(n)) => n.as_i64(),
        Some(geojson::feature::Id::String(s)) => s.parse().ok(),
        None => tags.get("id").and_then(|s| s.parse().ok()),
    }
}

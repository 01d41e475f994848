//! Feature sources for the analysis pipeline.
//!
//! The upstream feature store is a black box queryable by bounding
//! region; [`FeatureStore`] is that boundary. [`GeoJsonStore`] reads
//! exported FeatureCollections from disk, [`MemoryStore`] backs tests
//! and demos.

mod geojson_store;
mod memory;

pub use geojson_store::GeoJsonStore;
pub use memory::MemoryStore;

use geo::{BoundingRect, Geometry, Intersects, Rect};
use hashbrown::HashMap;

use crate::Error;

/// One feature as the store hands it out: geographic geometry plus its
/// raw tags.
#[derive(Debug, Clone)]
pub struct RawFeature {
    pub id: i64,
    pub geometry: Geometry<f64>,
    pub tags: HashMap<String, String>,
}

impl RawFeature {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Boundary to the upstream feature store. All queries take a
/// geographic envelope and return every feature whose bounding box
/// intersects it (coarse accept).
pub trait FeatureStore: Send + Sync {
    /// Point features tagged as pedestrian crossings.
    fn crossing_points(&self, envelope: Rect<f64>) -> Result<Vec<RawFeature>, Error>;
    /// Line features tagged as crossing-typed path segments.
    fn crossing_ways(&self, envelope: Rect<f64>) -> Result<Vec<RawFeature>, Error>;
    /// Road-network line features tagged with a road class.
    fn roads(&self, envelope: Rect<f64>) -> Result<Vec<RawFeature>, Error>;
}

/// Bounding-box filter shared by the in-process store implementations.
pub(crate) fn features_in_envelope(features: &[RawFeature], envelope: Rect<f64>) -> Vec<RawFeature> {
    features
        .iter()
        .filter(|feature| {
            feature
                .geometry
                .bounding_rect()
                .is_some_and(|rect| rect.intersects(&envelope))
        })
        .cloned()
        .collect()
}

//! In-memory feature store for tests and demos.

use geo::{Geometry, LineString, Point};
use hashbrown::HashMap;

use super::{FeatureStore, RawFeature, features_in_envelope};
use crate::Error;
use crate::model::RoadClass;

/// Vec-backed [`FeatureStore`] built up through the `with_*` methods.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    crossing_points: Vec<RawFeature>,
    crossing_ways: Vec<RawFeature>,
    roads: Vec<RawFeature>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a point crossing at geographic (lon, lat); `tag` is the
    /// raw crossing-type value, `None` for untagged.
    #[must_use]
    pub fn with_crossing_point(mut self, id: i64, lon: f64, lat: f64, tag: Option<&str>) -> Self {
        self.crossing_points.push(RawFeature {
            id,
            geometry: Geometry::Point(Point::new(lon, lat)),
            tags: crossing_tags(tag),
        });
        self
    }

    /// Adds a line crossing through geographic (lon, lat) vertices.
    #[must_use]
    pub fn with_crossing_way(
        mut self,
        id: i64,
        coords: &[(f64, f64)],
        tag: Option<&str>,
    ) -> Self {
        self.crossing_ways.push(RawFeature {
            id,
            geometry: Geometry::LineString(line_from(coords)),
            tags: crossing_tags(tag),
        });
        self
    }

    /// Adds a road way of the given class through geographic (lon, lat)
    /// vertices.
    #[must_use]
    pub fn with_road(
        mut self,
        id: i64,
        class: RoadClass,
        name: Option<&str>,
        coords: &[(f64, f64)],
    ) -> Self {
        let mut tags = HashMap::new();
        tags.insert("highway".to_string(), class.as_str().to_string());
        if let Some(name) = name {
            tags.insert("name".to_string(), name.to_string());
        }
        self.roads.push(RawFeature {
            id,
            geometry: Geometry::LineString(line_from(coords)),
            tags,
        });
        self
    }
}

impl FeatureStore for MemoryStore {
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

fn crossing_tags(tag: Option<&str>) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    if let Some(tag) = tag {
        tags.insert("crossing".to_string(), tag.to_string());
    }
    tags
}

fn line_from(coords: &[(f64, f64)]) -> LineString<f64> {
    coords.iter().map(|&(x, y)| geo::Coord { x, y }).collect()
}

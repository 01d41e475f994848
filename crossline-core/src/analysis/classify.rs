//! Crossing classification: normalize raw point and line features into
//! uniform [`Crossing`] entities.

use geo::{BoundingRect, Geometry, Intersects};
use itertools::Itertools;
use log::{info, warn};

use crate::loading::{FeatureStore, RawFeature};
use crate::model::{Crossing, CrossingGeometry, CrossingKind, Region};
use crate::{Error, proj};

/// Extracts and classifies all crossings intersecting the region's
/// bounding envelope.
///
/// Ids are assigned sequentially with point features first, each group
/// sorted by source id, so reruns over the same inputs number the
/// crossings identically. Eligibility is not applied here; the full
/// set is also used for reporting unmarked crossings.
///
/// # Errors
///
/// Fails only if a feature source fails; malformed features are
/// skipped with a warning.
pub fn classify_crossings(
    store: &dyn FeatureStore,
    region: &Region,
) -> Result<Vec<Crossing>, Error> {
    let envelope = region.geo_envelope();
    let points = store.crossing_points(envelope)?;
    let ways = store.crossing_ways(envelope)?;

    let mut crossings = Vec::with_capacity(points.len() + ways.len());
    let mut next_id = 0u64;

    for feature in points.into_iter().sorted_by_key(|f| f.id) {
        if let Some(crossing) = classify(&feature, CrossingKind::Point, region, next_id) {
            crossings.push(crossing);
            next_id += 1;
        }
    }
    for feature in ways.into_iter().sorted_by_key(|f| f.id) {
        if let Some(crossing) = classify(&feature, CrossingKind::Line, region, next_id) {
            crossings.push(crossing);
            next_id += 1;
        }
    }

    info!(
        "classified {} crossings ({} marked)",
        crossings.len(),
        crossings.iter().filter(|c| c.marked).count()
    );
    Ok(crossings)
}

fn classify(
    feature: &RawFeature,
    kind: CrossingKind,
    region: &Region,
    id: u64,
) -> Option<Crossing> {
    let intersects = feature
        .geometry
        .bounding_rect()
        .is_some_and(|rect| rect.intersects(&region.geo_envelope()));
    if !intersects {
        return None;
    }

    let geometry = match (&feature.geometry, kind) {
        (Geometry::Point(point), CrossingKind::Point) => {
            CrossingGeometry::Point(proj::project(point.x(), point.y()).into())
        }
        (Geometry::LineString(line), CrossingKind::Line) if line.0.len() >= 2 => {
            CrossingGeometry::Line(proj::project_line(line))
        }
        _ => {
            warn!(
                "crossing feature {} has unusable geometry for its source kind, skipping",
                feature.id
            );
            return None;
        }
    };

    Some(Crossing::new(id, kind, geometry, feature.tag("crossing")))
}

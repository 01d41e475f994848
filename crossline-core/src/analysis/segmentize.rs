//! Street segmentation: clip road ways to the region and cut them into
//! fixed-length segments.

use geo::line_measures::{Euclidean, LengthMeasurable};
use geo::{BooleanOps, Coord, Geometry, LineString, MultiLineString};
use itertools::Itertools;
use log::{info, warn};

use crate::loading::FeatureStore;
use crate::model::{AnalysisParams, Region, RoadClass, StreetSegment};
use crate::Error;

/// Clipped pieces shorter than this are floating-point artifacts of
/// the clipping step and are discarded.
const MIN_PIECE_LENGTH_M: f64 = 1e-3;

/// Sub-nanometer tail segments are rounding artifacts of an exact
/// step division, not real geometry.
const TAIL_EPS_M: f64 = 1e-9;

/// Extracts allow-listed road ways, clips them to the region polygon
/// and splits every clipped piece into step-length segments.
///
/// Ways are processed in source-id order and segment ids are assigned
/// sequentially, giving every segment a stable id for the resolver
/// join and the tile feature id.
///
/// # Errors
///
/// Fails only if the road source fails; ways with unusable geometry
/// are skipped with a warning.
pub fn segment_streets(
    store: &dyn FeatureStore,
    region: &Region,
    params: &AnalysisParams,
) -> Result<Vec<StreetSegment>, Error> {
    let roads = store.roads(region.geo_envelope())?;
    let mut segments = Vec::new();
    let mut next_id = 0u64;

    for feature in roads.into_iter().sorted_by_key(|f| f.id) {
        let Some(class) = feature.tag("highway").and_then(RoadClass::from_tag) else {
            continue;
        };
        if !params.road_classes.contains(&class) {
            continue;
        }
        let Geometry::LineString(ref line) = feature.geometry else {
            warn!("road way {} is not a line string, skipping", feature.id);
            continue;
        };
        if line.0.len() < 2 {
            continue;
        }

        let projected = crate::proj::project_line(line);
        // Clipping may split one way into multiple disjoint pieces;
        // each piece is treated independently.
        let clipped = region
            .polygon()
            .clip(&MultiLineString::new(vec![projected]), false);

        let name = feature.tag("name").map(str::to_owned);
        for piece in &clipped {
            if piece.length(&Euclidean) <= MIN_PIECE_LENGTH_M {
                continue;
            }
            for part in split_line(piece, params.step_meters) {
                let length_m = part.length(&Euclidean);
                if length_m <= 0.0 {
                    continue;
                }
                segments.push(StreetSegment {
                    id: next_id,
                    way_id: feature.id,
                    name: name.clone(),
                    road_class: class,
                    geometry: part,
                    length_m,
                    distance_to_crossing_m: None,
                    nearest_crossing_marked: None,
                });
                next_id += 1;
            }
        }
    }

    info!(
        "segmented streets into {} segments of up to {} m",
        segments.len(),
        params.step_meters
    );
    Ok(segments)
}

/// Splits a line at every multiple of `step` walked along it.
///
/// One pass over the coordinates, cutting exactly where the
/// accumulated length crosses a step boundary: the parts concatenate
/// back to the input with no gaps or overlaps, every part but the last
/// has length `step`, and the last has length in `(0, step]`.
pub(crate) fn split_line(line: &LineString<f64>, step: f64) -> Vec<LineString<f64>> {
    let coords = &line.0;
    if coords.len() < 2 || step <= 0.0 {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut current = vec![coords[0]];
    // Distance still to walk before the current part closes.
    let mut budget = step;

    for window in coords.windows(2) {
        let (start, end) = (window[0], window[1]);
        let mut from = start;
        let mut remaining = hypot(start, end);
        if remaining == 0.0 {
            continue;
        }

        while remaining >= budget {
            let t = budget / remaining;
            let cut = Coord {
                x: from.x + (end.x - from.x) * t,
                y: from.y + (end.y - from.y) * t,
            };
            current.push(cut);
            parts.push(LineString::new(std::mem::replace(&mut current, vec![cut])));
            remaining -= budget;
            budget = step;
            from = cut;
        }
        if remaining > 0.0 {
            budget -= remaining;
            current.push(end);
        }
    }

    if current.len() >= 2 {
        let tail = LineString::new(current);
        if tail.length(&Euclidean) > TAIL_EPS_M {
            parts.push(tail);
        }
    }
    parts
}

fn hypot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use super::*;
    use crate::loading::MemoryStore;
    use crate::model::RegionParams;

    fn lengths(parts: &[LineString<f64>]) -> Vec<f64> {
        parts.iter().map(|p| p.length(&Euclidean)).collect()
    }

    #[test]
    fn splits_45m_into_20_20_5() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 45.0, y: 0.0)];
        let parts = split_line(&line, 20.0);
        let lens = lengths(&parts);
        assert_eq!(lens.len(), 3);
        assert!((lens[0] - 20.0).abs() < 1e-9);
        assert!((lens[1] - 20.0).abs() < 1e-9);
        assert!((lens[2] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn exact_multiple_has_no_tail_sliver() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 60.0, y: 0.0)];
        let parts = split_line(&line, 20.0);
        assert_eq!(parts.len(), 3);
        for len in lengths(&parts) {
            assert!((len - 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn short_line_is_a_single_segment() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 7.5, y: 0.0)];
        let parts = split_line(&line, 20.0);
        assert_eq!(parts.len(), 1);
        assert!((lengths(&parts)[0] - 7.5).abs() < 1e-9);
    }

    #[test]
    fn lengths_sum_to_input_length_on_bent_lines() {
        let line = line_string![
            (x: 0.0, y: 0.0),
            (x: 13.0, y: 9.0),
            (x: 31.0, y: 2.0),
            (x: 55.0, y: 17.0)
        ];
        let total = line.length(&Euclidean);
        let parts = split_line(&line, 20.0);
        assert_eq!(parts.len() as f64, (total / 20.0).ceil());
        let sum: f64 = lengths(&parts).iter().sum();
        assert!((sum - total).abs() < 1e-9);
        // Full coverage: each part starts where the previous ended.
        for pair in parts.windows(2) {
            assert_eq!(pair[0].0.last(), pair[1].0.first());
        }
        // All but the last are exactly one step long.
        for len in &lengths(&parts)[..parts.len() - 1] {
            assert!((len - 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn segments_carry_way_attributes() {
        let region = RegionParams::default().build().unwrap();
        let store = MemoryStore::new().with_road(
            9,
            RoadClass::Primary,
            Some("High Street"),
            &[(0.0, 0.0), (0.0005, 0.0)],
        );
        let segments = segment_streets(&store, &region, &AnalysisParams::default()).unwrap();
        assert!(!segments.is_empty());
        for (idx, segment) in segments.iter().enumerate() {
            assert_eq!(segment.id, idx as u64);
            assert_eq!(segment.way_id, 9);
            assert_eq!(segment.name.as_deref(), Some("High Street"));
            assert_eq!(segment.road_class, RoadClass::Primary);
            assert!(segment.length_m > 0.0);
            assert!(segment.distance_to_crossing_m.is_none());
        }
    }

    #[test]
    fn disallowed_classes_are_not_segmented() {
        let region = RegionParams::default().build().unwrap();
        let store = MemoryStore::new().with_road(
            1,
            RoadClass::Trunk,
            None,
            &[(0.0, 0.0), (0.0005, 0.0)],
        );
        let params = AnalysisParams {
            road_classes: vec![RoadClass::Residential],
            ..AnalysisParams::default()
        };
        let segments = segment_streets(&store, &region, &params).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn way_clipped_by_region_loses_outside_part() {
        // Region covers lon 0..0.001; the way continues well past it.
        let region = RegionParams {
            min_lon: 0.0,
            min_lat: -0.001,
            max_lon: 0.001,
            max_lat: 0.001,
            buffer_meters: 0.0,
        }
        .build()
        .unwrap();
        let store = MemoryStore::new().with_road(
            1,
            RoadClass::Residential,
            None,
            &[(0.0, 0.0), (0.01, 0.0)],
        );
        let segments = segment_streets(&store, &region, &AnalysisParams::default()).unwrap();
        assert!(!segments.is_empty());
        let clipped_len: f64 = segments.iter().map(|s| s.length_m).sum();
        // 0.001 degrees of longitude at the equator is about 111 m.
        assert!(clipped_len < 130.0, "kept {clipped_len} m");
    }
}

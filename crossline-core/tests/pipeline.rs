//! End-to-end pipeline tests over an in-memory feature store.
//!
//! The scenario lives at the equator near the null island origin, where
//! Web Mercator meters line up with geodesic meters, so expected
//! distances can be stated exactly.

use crossline_core::prelude::*;
use crossline_core::proj;

/// Geographic longitude whose projection is `x_m` meters east of the
/// origin.
fn lon_at(x_m: f64) -> f64 {
    (x_m / proj::EARTH_RADIUS_M).to_degrees()
}

/// Geographic latitude whose projection is `y_m` meters north of the
/// equator.
fn lat_at(y_m: f64) -> f64 {
    proj::unproject(geo::Coord { x: 0.0, y: y_m }).1
}

fn equator_region() -> RegionParams {
    RegionParams {
        min_lon: -0.001,
        min_lat: -0.001,
        max_lon: 0.002,
        max_lat: 0.001,
        buffer_meters: 0.0,
    }
}

/// A 45 m residential road along the equator with one zebra crossing
/// 10 m north of its midpoint at x = 22.5 m.
fn scenario_store() -> MemoryStore {
    MemoryStore::new()
        .with_road(
            1,
            RoadClass::Residential,
            Some("Equator Road"),
            &[(0.0, 0.0), (lon_at(45.0), 0.0)],
        )
        .with_crossing_point(1, lon_at(22.5), lat_at(10.0), Some("zebra"))
}

fn scenario_params() -> AnalysisParams {
    AnalysisParams {
        region: equator_region(),
        ..AnalysisParams::default()
    }
}

#[test]
fn full_pipeline_annotates_expected_distances() {
    let snapshot = run_analysis(&scenario_store(), &scenario_params()).unwrap();

    assert_eq!(snapshot.crossings.len(), 1);
    assert!(snapshot.crossings[0].marked);

    // 45 m at a 20 m step: 20 + 20 + 5.
    assert_eq!(snapshot.segments.len(), 3);
    let lengths: Vec<f64> = snapshot.segments.iter().map(|s| s.length_m).collect();
    assert!((lengths[0] - 20.0).abs() < 1e-6);
    assert!((lengths[1] - 20.0).abs() < 1e-6);
    assert!((lengths[2] - 5.0).abs() < 1e-6);

    // Closest approaches to the crossing at (22.5, 10):
    //   segment 0 ends at x=20       -> hypot(2.5, 10)
    //   segment 1 passes under it    -> 10
    //   segment 2 starts at x=40     -> hypot(17.5, 10)
    let expected = [2.5f64.hypot(10.0), 10.0, 17.5f64.hypot(10.0)];
    for (segment, want) in snapshot.segments.iter().zip(expected) {
        let got = segment.distance_to_crossing_m.unwrap();
        assert!(
            (got - want).abs() < 1e-4,
            "segment {}: got {got}, want {want}",
            segment.id
        );
        assert_eq!(segment.nearest_crossing_marked, Some(true));
        assert_eq!(segment.way_id, 1);
        assert_eq!(segment.name.as_deref(), Some("Equator Road"));
    }
}

#[test]
fn rerun_with_identical_inputs_is_deterministic() {
    let store = scenario_store();
    let params = scenario_params();
    let first = run_analysis(&store, &params).unwrap();
    let second = run_analysis(&store, &params).unwrap();

    assert_eq!(first.crossings.len(), second.crossings.len());
    assert_eq!(first.segments.len(), second.segments.len());
    for (a, b) in first.segments.iter().zip(&second.segments) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.way_id, b.way_id);
        assert_eq!(a.length_m, b.length_m);
        assert_eq!(a.distance_to_crossing_m, b.distance_to_crossing_m);
    }
}

#[test]
fn unmarked_only_crossings_leave_distances_unset() {
    let store = MemoryStore::new()
        .with_road(
            1,
            RoadClass::Residential,
            None,
            &[(0.0, 0.0), (lon_at(45.0), 0.0)],
        )
        .with_crossing_point(1, lon_at(22.5), lat_at(10.0), Some("unmarked"));
    let snapshot = run_analysis(&store, &scenario_params()).unwrap();

    // The unmarked crossing is still in the dataset, just never a
    // nearest-crossing candidate.
    assert_eq!(snapshot.crossings.len(), 1);
    assert!(!snapshot.crossings[0].is_eligible());
    assert_eq!(snapshot.segments.len(), 3);
    for segment in &snapshot.segments {
        assert!(segment.distance_to_crossing_m.is_none());
        assert!(segment.nearest_crossing_marked.is_none());
    }
}

#[test]
fn untagged_crossing_is_a_candidate_but_reports_unmarked() {
    let store = MemoryStore::new()
        .with_road(
            1,
            RoadClass::Residential,
            None,
            &[(0.0, 0.0), (lon_at(45.0), 0.0)],
        )
        .with_crossing_point(1, lon_at(22.5), lat_at(10.0), None);
    let snapshot = run_analysis(&store, &scenario_params()).unwrap();

    for segment in &snapshot.segments {
        assert!(segment.distance_to_crossing_m.is_some());
        assert_eq!(segment.nearest_crossing_marked, Some(false));
    }
}

#[test]
fn snapshot_renders_tiles() {
    let snapshot = run_analysis(&scenario_store(), &scenario_params()).unwrap();

    // The world tile carries the street layer.
    let world = render_tile(&snapshot, TileCoord::new(0, 0, 0).unwrap()).unwrap();
    assert!(!world.is_empty());

    // A deep tile over the northwest corner of the pyramid sees
    // nothing and encodes empty.
    let empty = render_tile(&snapshot, TileCoord::new(14, 0, 0).unwrap()).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn geojson_exports_cover_the_dataset() {
    let snapshot = run_analysis(&scenario_store(), &scenario_params()).unwrap();

    let crossings = snapshot.crossings_to_geojson().unwrap();
    assert_eq!(crossings.features.len(), 1);
    let properties = crossings.features[0].properties.as_ref().unwrap();
    assert_eq!(properties["crossing_type"], "zebra");
    assert_eq!(properties["marked"], true);

    let segments = snapshot.segments_to_geojson().unwrap();
    assert_eq!(segments.features.len(), 3);
    let properties = segments.features[0].properties.as_ref().unwrap();
    assert_eq!(properties["road_class"], "residential");
    assert!(properties["distance_to_crossing_m"].as_f64().unwrap() > 0.0);
}

#[test]
fn far_crossing_distance_is_clamped_in_exports() {
    // Crossing 700 m from the road; the resolver stores the true
    // distance, exports clamp it to the reporting cap.
    let store = MemoryStore::new()
        .with_road(
            1,
            RoadClass::Residential,
            None,
            &[(0.0, 0.0), (lon_at(45.0), 0.0)],
        )
        .with_crossing_point(1, lon_at(22.5), lat_at(700.0), Some("zebra"));
    let params = AnalysisParams {
        region: RegionParams {
            min_lat: -0.01,
            max_lat: 0.01,
            ..equator_region()
        },
        ..AnalysisParams::default()
    };
    let snapshot = run_analysis(&store, &params).unwrap();

    let raw = snapshot.segments[1].distance_to_crossing_m.unwrap();
    assert!((raw - 700.0).abs() < 1e-3);

    let exported = snapshot.segments_to_geojson().unwrap();
    let properties = exported.features[1].properties.as_ref().unwrap();
    assert_eq!(
        properties["distance_to_crossing_m"].as_f64().unwrap(),
        MAX_REPORTED_DISTANCE_M
    );
}

#[test]
fn non_positive_step_is_rejected() {
    let params = AnalysisParams {
        step_meters: 0.0,
        ..scenario_params()
    };
    let err = run_analysis(&MemoryStore::new(), &params).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn invalid_region_fails_before_any_stage() {
    let params = AnalysisParams {
        region: RegionParams {
            min_lon: 1.0,
            min_lat: 0.0,
            max_lon: -1.0,
            max_lat: 1.0,
            buffer_meters: 0.0,
        },
        ..AnalysisParams::default()
    };
    let err = run_analysis(&MemoryStore::new(), &params).unwrap_err();
    assert!(matches!(err, Error::InvalidRegion(_)));
}

//! Pedestrian crossing entities and the tag predicates that classify
//! them.

use geo::{LineString, Point};

/// Tag value recorded when the source feature carries no crossing tag.
pub const UNKNOWN_CROSSING_TYPE: &str = "unknown";

/// Shape of the source feature a crossing was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingKind {
    Point,
    Line,
}

/// Crossing geometry in projected coordinates, used as-is for distance
/// computation (no snapping to road geometry).
#[derive(Debug, Clone)]
pub enum CrossingGeometry {
    Point(Point<f64>),
    Line(LineString<f64>),
}

/// A place pedestrians may cross a road. Created once per
/// classification run and never mutated.
#[derive(Debug, Clone)]
pub struct Crossing {
    pub id: u64,
    pub kind: CrossingKind,
    pub geometry: CrossingGeometry,
    /// Raw descriptive tag value, `"unknown"` when absent.
    pub crossing_type: String,
    pub marked: bool,
}

impl Crossing {
    pub fn new(
        id: u64,
        kind: CrossingKind,
        geometry: CrossingGeometry,
        tag: Option<&str>,
    ) -> Self {
        let crossing_type = match tag {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => UNKNOWN_CROSSING_TYPE.to_string(),
        };
        let marked = marked_from_tag(&crossing_type);
        Self {
            id,
            kind,
            geometry,
            crossing_type,
            marked,
        }
    }

    /// Whether this crossing participates in nearest-crossing queries.
    ///
    /// Eligibility is a textual exclusion on the raw tag, not the
    /// `marked` flag: a crossing typed `"unknown"` or
    /// `"traffic_signals"` is eligible even though `marked` is false.
    pub fn is_eligible(&self) -> bool {
        tag_is_eligible(&self.crossing_type)
    }
}

/// True iff the tag indicates road markings: it contains `"marked"` or
/// `"zebra"` case-insensitively. `"unmarked"` would also contain
/// `"marked"`, so it is checked first and wins.
pub fn marked_from_tag(tag: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    if tag.contains("unmarked") {
        return false;
    }
    tag.contains("marked") || tag.contains("zebra")
}

/// True iff the raw tag does not contain `"unmarked"` case-insensitively.
pub fn tag_is_eligible(tag: &str) -> bool {
    !tag.to_ascii_lowercase().contains("unmarked")
}

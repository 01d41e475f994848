//! Street segments: fixed-length slices of clipped road ways.

use std::fmt;

use geo::LineString;
use serde::{Deserialize, Serialize};

/// Road classes eligible for segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Residential,
    Tertiary,
    Secondary,
    Primary,
    Trunk,
}

impl RoadClass {
    pub const ALL: [RoadClass; 5] = [
        RoadClass::Residential,
        RoadClass::Tertiary,
        RoadClass::Secondary,
        RoadClass::Primary,
        RoadClass::Trunk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoadClass::Residential => "residential",
            RoadClass::Tertiary => "tertiary",
            RoadClass::Secondary => "secondary",
            RoadClass::Primary => "primary",
            RoadClass::Trunk => "trunk",
        }
    }

    /// Parse a raw road-class tag value. Unknown classes yield `None`
    /// and are not segmented.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "residential" => Some(RoadClass::Residential),
            "tertiary" => Some(RoadClass::Tertiary),
            "secondary" => Some(RoadClass::Secondary),
            "primary" => Some(RoadClass::Primary),
            "trunk" => Some(RoadClass::Trunk),
            _ => None,
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step-length slice of a clipped road way, the unit of distance
/// annotation and tile rendering.
///
/// `distance_to_crossing_m` and `nearest_crossing_marked` start unset
/// and are populated exactly once by the nearest-crossing resolver.
/// They stay `None` when no eligible crossing exists anywhere in the
/// dataset; callers must treat that as "unknown", not zero.
#[derive(Debug, Clone)]
pub struct StreetSegment {
    /// Stable id assigned at segmentation time, the join key for the
    /// resolver and the tile feature id.
    pub id: u64,
    pub way_id: i64,
    pub name: Option<String>,
    pub road_class: RoadClass,
    /// Projected geometry.
    pub geometry: LineString<f64>,
    pub length_m: f64,
    pub distance_to_crossing_m: Option<f64>,
    pub nearest_crossing_marked: Option<bool>,
}

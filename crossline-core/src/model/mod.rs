//! Data model for the crossing-distance analysis
//!
//! Everything here is built once per pipeline run and never mutated
//! afterwards; readers share snapshots by reference.

pub mod crossing;
pub mod export;
pub mod region;
pub mod segment;
pub mod snapshot;

pub use crossing::{Crossing, CrossingGeometry, CrossingKind, marked_from_tag, tag_is_eligible};
pub use region::{Region, RegionParams};
pub use segment::{RoadClass, StreetSegment};
pub use snapshot::{AnalysisParams, AnalysisSnapshot};

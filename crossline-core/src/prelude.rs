// Re-export key components
pub use crate::analysis::{annotate_segments, classify_crossings, run_analysis, segment_streets};
pub use crate::error::Error;
pub use crate::loading::{FeatureStore, GeoJsonStore, MemoryStore, RawFeature};
pub use crate::model::{
    AnalysisParams, AnalysisSnapshot, Crossing, CrossingGeometry, CrossingKind, Region,
    RegionParams, RoadClass, StreetSegment,
};
pub use crate::tile::{TileCoord, render_tile};
pub use crate::{DEFAULT_STEP_METERS, MAX_REPORTED_DISTANCE_M};

//! Crossline core: distance-to-nearest-crossing analysis over a road
//! network, published as Mapbox vector tiles.
//!
//! The pipeline runs in stages: build the analysis [`Region`], classify
//! pedestrian crossings and cut the road network into fixed-length
//! segments (both depend only on the region and run concurrently),
//! annotate every segment with the planar distance to its nearest
//! eligible crossing, and publish the whole result as an immutable
//! [`AnalysisSnapshot`] that the tile encoder reads.
//!
//! [`Region`]: model::Region
//! [`AnalysisSnapshot`]: model::AnalysisSnapshot

pub mod analysis;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod proj;
pub mod tile;

pub use error::Error;

/// Default length of a street segment in meters.
pub const DEFAULT_STEP_METERS: f64 = 20.0;

/// Distances reported in tile attributes and dataset exports are
/// clamped to this value so renderer color scales stay bounded.
pub const MAX_REPORTED_DISTANCE_M: f64 = 500.0;

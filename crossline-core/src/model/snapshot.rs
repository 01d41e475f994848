//! The published output of one analysis run.

use geo::{BoundingRect, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};
use serde::{Deserialize, Serialize};

use crate::DEFAULT_STEP_METERS;
use crate::model::{Crossing, Region, RegionParams, RoadClass, StreetSegment};

/// Complete parameter set for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub region: RegionParams,
    pub step_meters: f64,
    pub road_classes: Vec<RoadClass>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            region: RegionParams::default(),
            step_meters: DEFAULT_STEP_METERS,
            road_classes: RoadClass::ALL.to_vec(),
        }
    }
}

type SegmentEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// One complete, immutable result of the analysis pipeline: the
/// crossing set, the fully annotated segment set, and the region and
/// parameters that produced them.
///
/// The segment envelope index is built here, so serving tiles from a
/// snapshot never constructs state. A rerun builds a brand-new
/// snapshot; publication is an `Arc` swap at the caller.
#[derive(Debug)]
pub struct AnalysisSnapshot {
    pub params: AnalysisParams,
    pub region: Region,
    pub crossings: Vec<Crossing>,
    pub segments: Vec<StreetSegment>,
    segment_index: RTree<SegmentEnvelope>,
}

impl AnalysisSnapshot {
    pub(crate) fn new(
        params: AnalysisParams,
        region: Region,
        crossings: Vec<Crossing>,
        segments: Vec<StreetSegment>,
    ) -> Self {
        let entries = segments
            .iter()
            .enumerate()
            .filter_map(|(idx, segment)| {
                segment.geometry.bounding_rect().map(|rect| {
                    SegmentEnvelope::new(
                        Rectangle::from_corners(
                            [rect.min().x, rect.min().y],
                            [rect.max().x, rect.max().y],
                        ),
                        idx,
                    )
                })
            })
            .collect();

        Self {
            params,
            region,
            crossings,
            segments,
            segment_index: RTree::bulk_load(entries),
        }
    }

    /// Segments whose bounding box intersects the projected envelope.
    /// Coarse: callers clip the returned geometry themselves.
    pub fn segments_intersecting(
        &self,
        envelope: Rect<f64>,
    ) -> impl Iterator<Item = &StreetSegment> {
        let aabb = AABB::from_corners(
            [envelope.min().x, envelope.min().y],
            [envelope.max().x, envelope.max().y],
        );
        self.segment_index
            .locate_in_envelope_intersecting(&aabb)
            .map(|entry| &self.segments[entry.data])
    }
}

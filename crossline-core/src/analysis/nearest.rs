//! Nearest-crossing resolution: annotate every segment with the planar
//! distance to the closest eligible crossing.

use geo::line_measures::{Distance, Euclidean, InterpolatableLine, LengthMeasurable};
use geo::{LineString, Point};
use log::info;
use rayon::prelude::*;
use rstar::{AABB, Envelope, PointDistance, RTree, RTreeObject};

use crate::model::{Crossing, CrossingGeometry, StreetSegment};

/// R-tree entry: one eligible crossing.
#[derive(Debug, Clone)]
struct IndexedCrossing {
    envelope: AABB<[f64; 2]>,
    geometry: CrossingGeometry,
    id: u64,
    marked: bool,
}

impl RTreeObject for IndexedCrossing {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for IndexedCrossing {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d = point_to_crossing(Point::new(point[0], point[1]), &self.geometry);
        d * d
    }
}

/// The winning crossing for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestCrossing {
    pub crossing_id: u64,
    pub distance_m: f64,
    pub marked: bool,
}

/// Spatial index over the *eligible* crossings, those whose raw tag
/// does not contain `"unmarked"`. Built once per run, queried
/// read-only from many threads.
pub struct CrossingIndex {
    tree: RTree<IndexedCrossing>,
}

impl CrossingIndex {
    pub fn build(crossings: &[Crossing]) -> Self {
        let entries = crossings
            .iter()
            .filter(|crossing| crossing.is_eligible())
            .map(|crossing| IndexedCrossing {
                envelope: crossing_envelope(&crossing.geometry),
                geometry: crossing.geometry.clone(),
                id: crossing.id,
                marked: crossing.marked,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Closest eligible crossing to the segment geometry by exact
    /// planar minimum distance (line-to-point or line-to-line, not
    /// centroid distance).
    ///
    /// Candidates come out of the index ordered by distance to the
    /// segment midpoint; the traversal stops once a candidate's
    /// midpoint distance minus half the segment length exceeds the
    /// best exact distance found, since no later candidate can beat
    /// it. Exact-distance ties break toward the lowest crossing id,
    /// independent of index traversal order.
    pub fn nearest(&self, geometry: &LineString<f64>) -> Option<NearestCrossing> {
        let midpoint = geometry.point_at_ratio_from_start(&Euclidean, 0.5)?;
        let half_length = geometry.length(&Euclidean) / 2.0;

        let mut best: Option<NearestCrossing> = None;
        for (candidate, midpoint_d2) in self
            .tree
            .nearest_neighbor_iter_with_distance_2(&[midpoint.x(), midpoint.y()])
        {
            if let Some(hit) = best
                && midpoint_d2.sqrt() - half_length > hit.distance_m
            {
                break;
            }
            let distance_m = segment_to_crossing(geometry, &candidate.geometry);
            let better = match best {
                None => true,
                Some(hit) => {
                    distance_m < hit.distance_m
                        || (distance_m == hit.distance_m && candidate.id < hit.crossing_id)
                }
            };
            if better {
                best = Some(NearestCrossing {
                    crossing_id: candidate.id,
                    distance_m,
                    marked: candidate.marked,
                });
            }
        }
        best
    }
}

/// Annotates every segment with its nearest eligible crossing.
///
/// Pure with respect to the crossing set; per-segment queries are
/// independent and run rayon-parallel against the immutable index.
/// With zero eligible crossings the distance fields stay unset.
pub fn annotate_segments(crossings: &[Crossing], segments: &mut [StreetSegment]) {
    let index = CrossingIndex::build(crossings);
    if index.is_empty() {
        info!("no eligible crossings; segment distances stay unset");
        return;
    }

    segments.par_iter_mut().for_each(|segment| {
        if let Some(hit) = index.nearest(&segment.geometry) {
            segment.distance_to_crossing_m = Some(hit.distance_m);
            segment.nearest_crossing_marked = Some(hit.marked);
        }
    });
    info!("annotated {} segments with crossing distances", segments.len());
}

fn crossing_envelope(geometry: &CrossingGeometry) -> AABB<[f64; 2]> {
    match geometry {
        CrossingGeometry::Point(point) => AABB::from_point([point.x(), point.y()]),
        CrossingGeometry::Line(line) => {
            let mut iter = line.coords();
            let first = iter.next().map_or([0.0, 0.0], |c| [c.x, c.y]);
            let mut aabb = AABB::from_point(first);
            for c in iter {
                aabb.merge(&AABB::from_point([c.x, c.y]));
            }
            aabb
        }
    }
}

fn point_to_crossing(point: Point<f64>, geometry: &CrossingGeometry) -> f64 {
    match geometry {
        CrossingGeometry::Point(other) => Euclidean.distance(point, *other),
        CrossingGeometry::Line(line) => Euclidean.distance(&point, line),
    }
}

fn segment_to_crossing(segment: &LineString<f64>, geometry: &CrossingGeometry) -> f64 {
    match geometry {
        CrossingGeometry::Point(point) => Euclidean.distance(point, segment),
        CrossingGeometry::Line(line) => Euclidean.distance(segment, line),
    }
}

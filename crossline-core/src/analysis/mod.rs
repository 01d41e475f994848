//! The analysis pipeline: classify crossings, segment streets, resolve
//! nearest-crossing distances, and assemble the snapshot.

mod classify;
mod nearest;
mod segmentize;

pub use classify::classify_crossings;
pub use nearest::{CrossingIndex, NearestCrossing, annotate_segments};
pub use segmentize::segment_streets;

use log::info;

use crate::loading::FeatureStore;
use crate::model::{AnalysisParams, AnalysisSnapshot};
use crate::Error;

/// Runs the whole pipeline and returns a freshly built snapshot.
///
/// Parameter validation is the only fatal check and happens before
/// any stage. Classification and segmentation both depend only on the
/// region, so the segmenter runs on a spawned thread while the
/// classifier runs on the calling thread. Rerunning with identical
/// inputs and parameters produces an equal snapshot (within
/// floating-point tolerance).
///
/// # Errors
///
/// Returns an error if the region or step parameters are invalid or a
/// feature source fails; malformed individual features are skipped,
/// not fatal.
pub fn run_analysis(
    store: &dyn FeatureStore,
    params: &AnalysisParams,
) -> Result<AnalysisSnapshot, Error> {
    if !params.step_meters.is_finite() || params.step_meters <= 0.0 {
        return Err(Error::InvalidData(format!(
            "step_meters must be positive and finite, got {}",
            params.step_meters
        )));
    }
    let region = params.region.build()?;
    info!(
        "analysis region built (buffer {} m, step {} m)",
        params.region.buffer_meters, params.step_meters
    );

    let (segments, crossings) = std::thread::scope(|scope| {
        let segmenter = scope.spawn(|| segment_streets(store, &region, params));
        let crossings = classify_crossings(store, &region);
        let segments = segmenter
            .join()
            .map_err(|_| Error::UnrecoverableError("street segmentation thread panicked"));
        (segments, crossings)
    });
    let mut segments = segments??;
    let crossings = crossings?;

    annotate_segments(&crossings, &mut segments);

    info!(
        "analysis complete: {} crossings, {} segments",
        crossings.len(),
        segments.len()
    );
    Ok(AnalysisSnapshot::new(
        params.clone(),
        region,
        crossings,
        segments,
    ))
}

//! Shared server state: the feature store and the published snapshot.

use std::sync::{Arc, RwLock};

use crossline_core::Error;
use crossline_core::prelude::{AnalysisParams, AnalysisSnapshot, FeatureStore, run_analysis};

/// Cloneable handle shared across request handlers.
///
/// The published snapshot is behind `RwLock<Option<Arc<..>>>`:
/// publication writes the option, readers clone the `Arc`, so a
/// rebuild never disturbs in-flight requests and no reader ever sees
/// a partially built snapshot.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn FeatureStore>,
    params: AnalysisParams,
    snapshot: RwLock<Option<Arc<AnalysisSnapshot>>>,
}

impl AppState {
    pub fn new(store: Arc<dyn FeatureStore>, params: AnalysisParams) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                params,
                snapshot: RwLock::new(None),
            }),
        }
    }

    /// The currently published snapshot.
    ///
    /// # Errors
    ///
    /// [`Error::SnapshotUnavailable`] before the first successful
    /// rebuild.
    pub fn snapshot(&self) -> Result<Arc<AnalysisSnapshot>, Error> {
        self.inner
            .snapshot
            .read()
            .map_err(|_| Error::UnrecoverableError("snapshot lock poisoned"))?
            .clone()
            .ok_or(Error::SnapshotUnavailable)
    }

    /// Reruns the pipeline and atomically publishes the new snapshot.
    ///
    /// The analysis is CPU-bound and runs on a blocking thread; a
    /// failed rebuild leaves the previous snapshot published.
    ///
    /// # Errors
    ///
    /// Propagates pipeline errors.
    pub async fn rebuild(&self) -> Result<(), Error> {
        let store = Arc::clone(&self.inner.store);
        let params = self.inner.params.clone();
        let snapshot = tokio::task::spawn_blocking(move || run_analysis(store.as_ref(), &params))
            .await
            .map_err(|_| Error::UnrecoverableError("analysis task panicked"))??;

        let mut slot = self
            .inner
            .snapshot
            .write()
            .map_err(|_| Error::UnrecoverableError("snapshot lock poisoned"))?;
        *slot = Some(Arc::new(snapshot));
        Ok(())
    }
}

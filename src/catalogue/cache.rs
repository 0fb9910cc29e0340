//! Load-once catalogue cache
//!
//! Concurrent callers share a single in-flight load. A successful load is
//! kept forever; a failed one is not cached, so the next caller retries.

use super::loader::{load_dir, LoadOptions};
use super::seed;
use super::ClinicData;
use crate::error::SearchError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Where the catalogue comes from
#[derive(Debug, Clone)]
pub enum CatalogueSource {
    /// Built-in reference data only
    Builtin,
    /// A data directory on disk
    Directory { path: PathBuf, options: LoadOptions },
}

impl CatalogueSource {
    fn load(&self) -> Result<ClinicData, SearchError> {
        match self {
            CatalogueSource::Builtin => Ok(seed::builtin()),
            CatalogueSource::Directory { path, options } => load_dir(path, options),
        }
    }
}

pub struct CatalogueCache {
    source: CatalogueSource,
    cell: OnceCell<Arc<ClinicData>>,
    attempts: AtomicUsize,
}

impl CatalogueCache {
    pub fn new(source: CatalogueSource) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::new(CatalogueSource::Directory {
            path: path.into(),
            options: LoadOptions::default(),
        })
    }

    /// Return the loaded data, loading it first if nobody has yet
    pub async fn get(&self) -> Result<Arc<ClinicData>, SearchError> {
        self.cell
            .get_or_try_init(|| async {
                let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                debug!("Loading catalogue from {:?} (attempt {})", self.source, attempt);

                let source = self.source.clone();
                let data = tokio::task::spawn_blocking(move || source.load())
                    .await
                    .map_err(|e| {
                        SearchError::CatalogueUnavailable(format!("loader task failed: {}", e))
                    })??;

                info!("Catalogue ready: {} entries", data.catalogue.len());
                Ok::<_, SearchError>(Arc::new(data))
            })
            .await
            .map(Arc::clone)
    }

    /// Data if a load already completed, without triggering one
    pub fn get_loaded(&self) -> Option<Arc<ClinicData>> {
        self.cell.get().cloned()
    }

    /// How many loads were started, successful or not
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

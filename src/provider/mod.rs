#[cfg(feature = "download")]
mod http;

use std::{collections::HashMap, io::Read, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;

use crate::district::FeatureCollection;
use crate::io::read_feature_collection;

#[cfg(feature = "download")]
pub use http::HttpProvider;

/// Source of parsed boundary datasets, addressed by dataset path such as
/// "/districts/congressional-districts.geojson".
///
/// The engine never knows whether a dataset came from disk, the network or
/// memory; deployment-specific adapters decide that.
pub trait BoundaryDataProvider: Send + Sync {
    fn load_dataset(&self, path: &str) -> Result<FeatureCollection>;
}

impl<P: BoundaryDataProvider + ?Sized> BoundaryDataProvider for Box<P> {
    fn load_dataset(&self, path: &str) -> Result<FeatureCollection> { (**self).load_dataset(path) }
}

impl<P: BoundaryDataProvider + ?Sized> BoundaryDataProvider for Arc<P> {
    fn load_dataset(&self, path: &str) -> Result<FeatureCollection> { (**self).load_dataset(path) }
}

/// Parse dataset bytes, gunzipping first when the path ends in `.gz`.
fn decode_dataset(path: &str, bytes: &[u8]) -> Result<FeatureCollection> {
    if path.ends_with(".gz") {
        let mut json = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut json)
            .with_context(|| format!("Failed to decompress {path}"))?;
        read_feature_collection(&json)
    } else {
        read_feature_collection(bytes)
    }
}

/// Datasets stored under a root directory.
pub struct DiskProvider {
    root: PathBuf,
}

impl DiskProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    /// Full filesystem path of a dataset path.
    pub fn full(&self, path: &str) -> PathBuf { self.root.join(path.trim_start_matches('/')) }
}

impl BoundaryDataProvider for DiskProvider {
    fn load_dataset(&self, path: &str) -> Result<FeatureCollection> {
        let full = self.full(path);
        let bytes = std::fs::read(&full)
            .with_context(|| format!("Failed to read dataset {}", full.display()))?;
        decode_dataset(path, &bytes)
    }
}

/// Datasets held in memory, keyed by dataset path.
#[derive(Default, Clone)]
pub struct MemProvider {
    pub(crate) files: HashMap<String, Arc<[u8]>>,
}

impl MemProvider {
    pub fn new(files: HashMap<String, Arc<[u8]>>) -> Self { Self { files } }

    /// Add or replace a dataset.
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.files.insert(path.into(), bytes.into());
    }
}

impl BoundaryDataProvider for MemProvider {
    fn load_dataset(&self, path: &str) -> Result<FeatureCollection> {
        let bytes = self.files.get(path)
            .ok_or_else(|| anyhow!("missing dataset: {path}"))?;
        decode_dataset(path, bytes)
    }
}

/// Try `primary`, and on failure `secondary`; both errors are reported if
/// neither succeeds.
pub struct FallbackProvider<A, B> {
    primary: A,
    secondary: B,
}

impl<A, B> FallbackProvider<A, B> {
    pub fn new(primary: A, secondary: B) -> Self { Self { primary, secondary } }
}

impl<A: BoundaryDataProvider, B: BoundaryDataProvider> BoundaryDataProvider for FallbackProvider<A, B> {
    fn load_dataset(&self, path: &str) -> Result<FeatureCollection> {
        match self.primary.load_dataset(path) {
            Ok(collection) => Ok(collection),
            Err(primary) => {
                tracing::debug!("primary provider failed for {path}: {primary:#}; trying fallback");
                self.secondary.load_dataset(path)
                    .with_context(|| format!("fallback after primary failure ({primary:#})"))
            }
        }
    }
}

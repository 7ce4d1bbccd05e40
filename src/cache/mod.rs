mod ttl;

use std::time::Duration;

use serde::Serialize;

use crate::batch::BatchResult;
use crate::config::EngineConfig;
use crate::district::{DistrictSet, FeatureCollection};

pub use ttl::{CacheStats, TtlCache};

/// Approximate in-memory size of a cached value, in bytes.
pub trait Weighted {
    fn weight(&self) -> usize;
}

impl Weighted for FeatureCollection {
    /// Two f64 per coordinate plus a fixed overhead per feature.
    fn weight(&self) -> usize {
        self.num_coords() * 16 + self.len() * 128
    }
}

impl Weighted for BatchResult {
    /// Length of the JSON encoding.
    fn weight(&self) -> usize {
        serde_json::to_vec(self).map_or(0, |json| json.len())
    }
}

/// Counters of both cache namespaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub datasets: CacheStats,
    pub results: CacheStats,
}

/// The dataset and result caches shared by every engine call.
pub struct CacheService {
    datasets: TtlCache<FeatureCollection>,
    results: TtlCache<BatchResult>,
}

impl Default for CacheService {
    fn default() -> Self { Self::from_config(&EngineConfig::default()) }
}

impl CacheService {
    /// Two caches with the same TTL, each with its own `max_bytes` budget.
    pub fn new(ttl: Duration, max_bytes: usize) -> Self {
        Self {
            datasets: TtlCache::new("dataset", ttl, max_bytes),
            results: TtlCache::new("result", ttl, max_bytes),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cache_ttl(), config.cache_max_bytes)
    }

    /// Key of a loaded dataset.
    pub fn dataset_key(path: &str) -> String { format!("geojson:{path}") }

    /// Key of a finished batch.
    pub fn result_key(set: DistrictSet, enhanced: bool) -> String { format!("gerry:{set}:{enhanced}") }

    #[inline] pub fn datasets(&self) -> &TtlCache<FeatureCollection> { &self.datasets }

    #[inline] pub fn results(&self) -> &TtlCache<BatchResult> { &self.results }

    pub fn clear_all(&self) {
        self.datasets.clear();
        self.results.clear();
        tracing::info!("cleared dataset and result caches");
    }

    /// Drop `key` from whichever namespace holds it.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.datasets.remove(key) | self.results.remove(key);
        tracing::debug!("cache delete {key}: {}", if removed { "removed" } else { "not present" });
        removed
    }

    /// Sweep expired entries from both namespaces.
    pub fn cleanup(&self) -> usize {
        let removed = self.datasets.cleanup() + self.results.cleanup();
        tracing::info!("cleaned up {removed} expired cache entries");
        removed
    }

    /// Keys of both namespaces, sorted, optionally filtered by a `*` glob.
    pub fn keys(&self, pattern: Option<&str>) -> Vec<String> {
        let mut keys = self.datasets.keys(pattern);
        keys.extend(self.results.keys(pattern));
        keys.sort();
        keys
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats { datasets: self.datasets.stats(), results: self.results.stats() }
    }
}

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use serde::Serialize;

use crate::batch::{BatchProcessor, BatchResult, CHUNK_SIZE};
use crate::cache::CacheService;
use crate::config::EngineConfig;
use crate::district::{DistrictSet, FeatureCollection};
use crate::error::EngineError;
use crate::monitor::PerformanceMonitor;
use crate::provider::BoundaryDataProvider;
use crate::score::Scorer;

const ENDPOINT: &str = "compactness";

/// Scores for one district set, as handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactnessReport {
    pub district_type: DistrictSet,
    #[serde(flatten)]
    pub batch: BatchResult,
    /// Served from the result cache.
    pub cached: bool,
    pub processing_time_ms: u64,
}

/// Outcome of a fresh, uncached dataset load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub district_type: DistrictSet,
    pub dataset_path: String,
    pub success: bool,
    pub feature_count: usize,
    pub load_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Computes compactness reports for district sets loaded through `P`.
///
/// Datasets and finished batches are cached in a [`CacheService`] that may
/// be shared between engines.
pub struct Engine<P> {
    provider: P,
    config: EngineConfig,
    scorer: Scorer,
    cache: Arc<CacheService>,
    monitor: Arc<PerformanceMonitor>,
}

impl<P: BoundaryDataProvider> Engine<P> {
    pub fn new(provider: P, config: EngineConfig) -> Self {
        let cache = Arc::new(CacheService::from_config(&config));
        Self::with_cache(provider, config, cache)
    }

    pub fn with_cache(provider: P, config: EngineConfig, cache: Arc<CacheService>) -> Self {
        let scorer = Scorer::new(config.area_model, config.perimeter_mode);
        Self { provider, config, scorer, cache, monitor: Arc::new(PerformanceMonitor::new()) }
    }

    #[inline] pub fn provider(&self) -> &P { &self.provider }

    #[inline] pub fn config(&self) -> &EngineConfig { &self.config }

    #[inline] pub fn cache(&self) -> &CacheService { &self.cache }

    #[inline] pub fn monitor(&self) -> &PerformanceMonitor { &self.monitor }

    /// Score every district of the set named `key`, yielding the thread
    /// between chunks.
    ///
    /// With `skip_cache`, a cached result is ignored but the fresh result
    /// still replaces it.
    pub fn compute_district_compactness(&self, key: &str, enhanced: bool, skip_cache: bool)
        -> Result<CompactnessReport, EngineError>
    {
        self.compute_with_yield(key, enhanced, skip_cache, std::thread::yield_now)
    }

    /// Like [`compute_district_compactness`](Self::compute_district_compactness),
    /// calling `yield_now` between chunks.
    pub fn compute_with_yield(&self, key: &str, enhanced: bool, skip_cache: bool, yield_now: impl FnMut())
        -> Result<CompactnessReport, EngineError>
    {
        self.compute(key, enhanced, skip_cache, |processor| processor.run(yield_now))
    }

    /// Like [`compute_district_compactness`](Self::compute_district_compactness),
    /// scoring chunks on the rayon thread pool.
    #[cfg(feature = "parallel")]
    pub fn compute_parallel(&self, key: &str, enhanced: bool, skip_cache: bool)
        -> Result<CompactnessReport, EngineError>
    {
        self.compute(key, enhanced, skip_cache, BatchProcessor::run_parallel)
    }

    fn compute<F>(&self, key: &str, enhanced: bool, skip_cache: bool, run: F) -> Result<CompactnessReport, EngineError>
    where
        F: FnOnce(BatchProcessor) -> BatchResult,
    {
        let start = Instant::now();
        let set: DistrictSet = key.parse()?;
        let result_key = CacheService::result_key(set, enhanced);

        if !skip_cache {
            if let Some(batch) = self.cache.results().get(&result_key) {
                tracing::debug!("serving {set} from result cache");
                return Ok(self.report(set, BatchResult::clone(&batch), true, start));
            }
        }

        tracing::info!("computing compactness for {set} (enhanced: {enhanced})");
        let mut processor = BatchProcessor::new(self.scorer, enhanced, CHUNK_SIZE);
        if let Err(e) = processor.load(|| self.load_dataset(set)) {
            tracing::warn!("{e}");
            return Err(e);
        }

        let batch = run(processor);
        tracing::info!(
            "scored {} {set} districts in {}ms",
            batch.statistics.total_districts,
            start.elapsed().as_millis(),
        );
        self.cache.results().insert(result_key, Arc::new(batch.clone()));

        Ok(self.report(set, batch, false, start))
    }

    fn report(&self, set: DistrictSet, batch: BatchResult, cached: bool, start: Instant) -> CompactnessReport {
        let elapsed = start.elapsed();
        self.monitor.record(ENDPOINT, elapsed, cached, batch.scores.len(), batch.enhanced);
        CompactnessReport {
            district_type: set,
            batch,
            cached,
            processing_time_ms: millis(elapsed),
        }
    }

    /// The parsed dataset behind `set`, from the dataset cache when present.
    pub fn load_dataset(&self, set: DistrictSet) -> Result<Arc<FeatureCollection>, EngineError> {
        let path = set.dataset_path();
        let cache_key = CacheService::dataset_key(path);
        if let Some(dataset) = self.cache.datasets().get(&cache_key) {
            tracing::debug!("serving {path} from dataset cache");
            return Ok(dataset);
        }

        let dataset = Arc::new(self.fetch(set)?);
        self.cache.datasets().insert(cache_key, dataset.clone());
        Ok(dataset)
    }

    /// Load `set` straight from the provider, bypassing every cache.
    fn fetch(&self, set: DistrictSet) -> Result<FeatureCollection, EngineError> {
        let path = set.dataset_path();
        let dataset = self.provider.load_dataset(path).map_err(|cause| EngineError::DatasetLoad {
            key: set.key().to_string(),
            path: path.to_string(),
            cause,
        })?;

        if dataset.is_empty() {
            return Err(EngineError::EmptyDataset { key: set.key().to_string(), path: path.to_string() });
        }
        tracing::debug!("loaded {} features ({} coordinates) from {path}", dataset.len(), dataset.num_coords());
        Ok(dataset)
    }

    /// Try a fresh load of `set` and report what happened.
    pub fn diagnose(&self, set: DistrictSet) -> Diagnosis {
        let start = Instant::now();
        let loaded = self.fetch(set);
        let load_time_ms = millis(start.elapsed());

        let (success, feature_count, error) = match loaded {
            Ok(dataset) => (true, dataset.len(), None),
            Err(e) => (false, 0, Some(e.to_string())),
        };
        Diagnosis {
            district_type: set,
            dataset_path: set.dataset_path().to_string(),
            success,
            feature_count,
            load_time_ms,
            error,
        }
    }
}

#[inline]
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

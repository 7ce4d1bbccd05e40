use std::{collections::BTreeMap, sync::Arc};

use geo::Rect;

use crate::district::{DistrictShape, FeatureCollection, PolygonFeature};
use crate::error::EngineError;
use crate::score::{CompactnessResult, Scorer};

use super::{BatchResult, BatchState, GeographicSummary, Statistics};

/// Score produced for one feature: district id, reported score, and the
/// full breakdown in enhanced mode.
type Scored = (String, f64, Option<CompactnessResult>);

/// Districts scored between two yield points of an engine run.
pub const CHUNK_SIZE: usize = 50;

/// Scores every district of one dataset in fixed-size chunks.
///
/// Drive it with [`BatchProcessor::load`] and then [`BatchProcessor::run`],
/// which hands control back to the host between chunks; or step through
/// chunks manually with [`BatchProcessor::step`].
#[derive(Debug)]
pub struct BatchProcessor {
    scorer: Scorer,
    enhanced: bool,
    chunk_size: usize,
    state: BatchState,
    dataset: Option<Arc<FeatureCollection>>,
    global_bounds: Option<Rect<f64>>,
    cursor: usize,
    scores: BTreeMap<String, f64>,
    detailed: BTreeMap<String, CompactnessResult>,
}

impl BatchProcessor {
    pub fn new(scorer: Scorer, enhanced: bool, chunk_size: usize) -> Self {
        Self {
            scorer,
            enhanced,
            chunk_size: chunk_size.max(1),
            state: BatchState::Idle,
            dataset: None,
            global_bounds: None,
            cursor: 0,
            scores: BTreeMap::new(),
            detailed: BTreeMap::new(),
        }
    }

    #[inline] pub fn state(&self) -> BatchState { self.state }

    /// Number of features visited so far.
    #[inline] pub fn progress(&self) -> usize { self.cursor }

    /// Load the dataset through `loader`. A load failure moves the batch to
    /// `Failed` and is returned unchanged.
    pub fn load<F>(&mut self, loader: F) -> Result<(), EngineError>
    where
        F: FnOnce() -> Result<Arc<FeatureCollection>, EngineError>,
    {
        debug_assert_eq!(self.state, BatchState::Idle, "dataset already loaded");
        self.state = BatchState::LoadingDataset;

        match loader() {
            Ok(dataset) => {
                // One bounding box for the whole set, shared by every district.
                self.global_bounds = dataset.bounds();
                self.state = if dataset.is_empty() { BatchState::Aggregating } else { BatchState::ProcessingChunk };
                self.dataset = Some(dataset);
                Ok(())
            }
            Err(e) => {
                self.state = BatchState::Failed;
                Err(e)
            }
        }
    }

    /// Score the next chunk of features and return the new state.
    pub fn step(&mut self) -> BatchState {
        if self.state != BatchState::ProcessingChunk { return self.state }
        let Some(dataset) = self.dataset.clone() else { return self.state };

        let features = dataset.features();
        let end = (self.cursor + self.chunk_size).min(features.len());
        for (index, feature) in features[self.cursor..end].iter().enumerate() {
            if let Some(scored) = self.score_feature(self.cursor + index, feature) {
                self.insert(scored);
            }
        }
        tracing::trace!("scored features {}..{} of {}", self.cursor, end, features.len());

        self.cursor = end;
        if self.cursor >= features.len() { self.state = BatchState::Aggregating }
        self.state
    }

    /// Score all remaining chunks, calling `yield_now` between chunks (never
    /// after the last), then aggregate.
    pub fn run(mut self, mut yield_now: impl FnMut()) -> BatchResult {
        while self.step() == BatchState::ProcessingChunk {
            yield_now();
        }
        self.finish()
    }

    /// Score all remaining chunks on the rayon thread pool, then aggregate.
    /// Results are merged in feature order, so the output matches [`run`](Self::run).
    #[cfg(feature = "parallel")]
    pub fn run_parallel(mut self) -> BatchResult {
        use rayon::prelude::*;

        if self.state == BatchState::ProcessingChunk {
            if let Some(dataset) = self.dataset.clone() {
                let start = self.cursor;
                let chunk_size = self.chunk_size;
                let chunks: Vec<Vec<Scored>> = dataset.features()[start..]
                    .par_chunks(chunk_size)
                    .enumerate()
                    .map(|(chunk, features)| {
                        features.iter().enumerate()
                            .filter_map(|(offset, feature)| {
                                self.score_feature(start + chunk * chunk_size + offset, feature)
                            })
                            .collect()
                    })
                    .collect();

                chunks.into_iter().flatten().for_each(|scored| self.insert(scored));
                self.cursor = dataset.len();
                self.state = BatchState::Aggregating;
            }
        }
        self.finish()
    }

    /// Compute statistics over the collected scores and hand back the result.
    fn finish(mut self) -> BatchResult {
        self.state = BatchState::Aggregating;

        let scores: Vec<f64> = self.scores.values().copied().collect();
        let statistics = Statistics::from_scores(&scores);
        let (detailed, geographic_summary) = if self.enhanced {
            let summary = GeographicSummary::from_results(self.detailed.values());
            (Some(std::mem::take(&mut self.detailed)), Some(summary))
        } else {
            (None, None)
        };

        self.state = BatchState::Done;
        BatchResult {
            enhanced: self.enhanced,
            scores: std::mem::take(&mut self.scores),
            detailed,
            statistics,
            geographic_summary,
        }
    }

    /// Later features with the same id replace earlier ones.
    fn insert(&mut self, (id, score, detail): Scored) {
        if let Some(detail) = detail {
            self.detailed.insert(id.clone(), detail);
        }
        self.scores.insert(id, score);
    }

    /// Score one feature; `None` for features that are not districts.
    fn score_feature(&self, index: usize, feature: &PolygonFeature) -> Option<Scored> {
        let id = match &feature.shape {
            DistrictShape::Unsupported(_) => return None,
            _ => feature.district_id(index),
        };

        let result = match &feature.shape {
            DistrictShape::Area(shape) if self.enhanced => self.scorer.score(shape, self.global_bounds),
            DistrictShape::Area(shape) => {
                return Some((id, self.scorer.polsby_popper(shape), None))
            }
            DistrictShape::Malformed(reason) => {
                tracing::debug!("district {id} has malformed geometry, scoring 0: {reason}");
                CompactnessResult::ZERO
            }
            DistrictShape::Unsupported(_) => return None,
        };

        if self.enhanced {
            Some((id, result.adjusted_score, Some(result)))
        } else {
            Some((id, result.polsby_popper, None))
        }
    }
}

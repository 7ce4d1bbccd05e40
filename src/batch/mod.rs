mod processor;
mod stats;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::score::CompactnessResult;

pub use processor::{BatchProcessor, CHUNK_SIZE};
pub use stats::{GeographicSummary, Statistics};

/// Lifecycle of one batch computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    LoadingDataset,
    ProcessingChunk,
    Aggregating,
    Done,
    Failed,
}

/// Scores and aggregates for one district set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub enhanced: bool,
    /// District id to reported score: the adjusted score in enhanced mode,
    /// raw Polsby-Popper otherwise.
    pub scores: BTreeMap<String, f64>,
    /// Full breakdown per district, enhanced mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed: Option<BTreeMap<String, CompactnessResult>>,
    pub statistics: Statistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_summary: Option<GeographicSummary>,
}

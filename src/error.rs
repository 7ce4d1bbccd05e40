use thiserror::Error;

/// Reasons a compactness report could not be produced.
///
/// Degenerate geometry never shows up here: a district that cannot be
/// measured scores zero and the batch carries on.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller did not name a district set.
    #[error("district type parameter is required")]
    MissingDistrictSet,

    /// The key does not name a known district set.
    #[error("invalid district type: {0}")]
    InvalidDistrictSet(String),

    /// The boundary-data provider could not produce the dataset.
    #[error("failed to load {key} dataset from {path}: {cause:#}")]
    DatasetLoad {
        key: String,
        path: String,
        cause: anyhow::Error,
    },

    /// The dataset loaded but holds no features.
    #[error("no features found in district data for {key} ({path})")]
    EmptyDataset { key: String, path: String },
}

impl EngineError {
    /// Whether the caller sent a bad request (as opposed to a load failure).
    pub fn is_caller_error(&self) -> bool {
        matches!(self, EngineError::MissingDistrictSet | EngineError::InvalidDistrictSet(_))
    }
}

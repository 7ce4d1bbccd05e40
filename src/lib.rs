#![doc = "Gerryscore: district compactness scoring"]
mod batch;
mod cache;
mod config;
mod district;
mod engine;
mod error;
mod io;
mod monitor;
mod provider;
mod score;

#[doc(inline)]
pub use engine::{CompactnessReport, Diagnosis, Engine};

#[doc(inline)]
pub use error::EngineError;

#[doc(inline)]
pub use config::EngineConfig;

#[doc(inline)]
pub use district::{DistrictProperties, DistrictSet, DistrictShape, FeatureCollection, IdField, PolygonFeature};

#[doc(inline)]
pub use io::{parse_feature_collection, read_feature_collection};

#[doc(inline)]
pub use provider::{BoundaryDataProvider, DiskProvider, FallbackProvider, MemProvider};

#[cfg(feature = "download")]
#[doc(inline)]
pub use provider::HttpProvider;

#[doc(inline)]
pub use score::{
    adjust_score, convex_hull_ratio, polsby_popper, BoundaryContext, CompactnessResult,
    PerimeterMode, Scorer, ShapeMeasure, ShapeSignals, BOUNDARY_TOLERANCE,
};

#[doc(inline)]
pub use batch::{BatchProcessor, BatchResult, BatchState, GeographicSummary, Statistics, CHUNK_SIZE};

#[doc(inline)]
pub use cache::{CacheService, CacheStats, ServiceStats, TtlCache, Weighted};

#[doc(inline)]
pub use monitor::{HealthStatus, Metric, PerformanceMonitor, PerformanceStats, PerformanceSummary, WindowSummary};

pub use polymetric::AreaModel;

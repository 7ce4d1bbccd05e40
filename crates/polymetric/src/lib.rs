pub mod hull;
pub mod measure;
pub mod sample;

pub use hull::{close_ring, convex_hull};
pub use measure::{bounds, merge_bounds, AreaModel, MeasureError, Measured};
pub use sample::{hull_ring, sample_ring, DEFAULT_SAMPLE_CAP};

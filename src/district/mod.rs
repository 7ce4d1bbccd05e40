mod feature;
mod set;

pub use feature::{DistrictProperties, DistrictShape, FeatureCollection, IdField, PolygonFeature};
pub use set::DistrictSet;

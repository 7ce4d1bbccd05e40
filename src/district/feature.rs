use geo::{MultiPolygon, Rect};
use polymetric::{bounds, merge_bounds};
use serde::{de::IgnoredAny, Deserialize};

/// A metadata value that may identify a district.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdField {
    Text(String),
    Number(serde_json::Number),
    Other(IgnoredAny),
}

impl IdField {
    /// Identifier text, or `None` for empty strings and non-scalar values.
    pub fn as_id(&self) -> Option<String> {
        match self {
            IdField::Text(text) if !text.is_empty() => Some(text.clone()),
            IdField::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for IdField {
    fn from(text: &str) -> Self { IdField::Text(text.to_string()) }
}

/// Feature properties that can name a district. Everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistrictProperties {
    #[serde(rename = "GEOID", default)]
    pub geoid: Option<IdField>,
    #[serde(rename = "ID", default)]
    pub id: Option<IdField>,
    #[serde(rename = "DISTRICT", default)]
    pub district: Option<IdField>,
    #[serde(rename = "CD", default)]
    pub cd: Option<IdField>,
    #[serde(rename = "NAME", default)]
    pub name: Option<IdField>,
}

/// Geometry of one feature, as far as scoring cares.
#[derive(Debug, Clone)]
pub enum DistrictShape {
    /// A Polygon or MultiPolygon. A Polygon is stored as a one-part MultiPolygon.
    Area(MultiPolygon<f64>),
    /// A Polygon or MultiPolygon whose coordinates could not be read.
    Malformed(String),
    /// Any other geometry type, or no geometry at all.
    Unsupported(String),
}

/// One district boundary with its metadata.
#[derive(Debug, Clone)]
pub struct PolygonFeature {
    /// Feature-level `id`, if present.
    pub id: Option<IdField>,
    pub properties: DistrictProperties,
    pub shape: DistrictShape,
}

impl PolygonFeature {
    /// Whether the batch processor scores this feature at all.
    #[inline]
    pub fn is_scored(&self) -> bool {
        !matches!(self.shape, DistrictShape::Unsupported(_))
    }

    /// Resolve the district identifier: GEOID, ID, DISTRICT, CD, NAME, the
    /// feature id, and finally `district_<index>`.
    pub fn district_id(&self, index: usize) -> String {
        let props = &self.properties;
        [&props.geoid, &props.id, &props.district, &props.cd, &props.name, &self.id]
            .into_iter()
            .find_map(|field| field.as_ref().and_then(IdField::as_id))
            .unwrap_or_else(|| format!("district_{index}"))
    }

    /// Bounding box of the feature's shape, if it has one.
    #[inline]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        match &self.shape {
            DistrictShape::Area(shape) => bounds(shape),
            _ => None,
        }
    }
}

/// An ordered, immutable collection of district features from one dataset.
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    features: Vec<PolygonFeature>,
    /// Number of coordinates across all shapes, used as a size estimate.
    num_coords: usize,
}

impl FeatureCollection {
    pub fn new(features: Vec<PolygonFeature>) -> Self {
        let num_coords = features.iter()
            .map(|feature| match &feature.shape {
                DistrictShape::Area(shape) => shape.0.iter()
                    .map(|polygon| polygon.exterior().0.len()
                        + polygon.interiors().iter().map(|ring| ring.0.len()).sum::<usize>())
                    .sum(),
                _ => 0,
            })
            .sum();
        Self { features, num_coords }
    }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline] pub fn features(&self) -> &[PolygonFeature] { &self.features }

    /// Total coordinate count across every shape.
    #[inline] pub fn num_coords(&self) -> usize { self.num_coords }

    /// Bounding box over every shape in the collection.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.features.iter()
            .filter_map(PolygonFeature::bounds)
            .reduce(merge_bounds)
    }
}

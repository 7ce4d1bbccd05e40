use std::fmt;

use geo::{
    orient::Direction, Area, BoundingRect, Coord, Euclidean, GeodesicArea, Length, LineString, MultiPolygon,
    Orient, Polygon, Rect,
};

/// How areas and lengths are measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AreaModel {
    /// Lon/lat input on the WGS84 ellipsoid; areas in m², lengths in m.
    #[default]
    Geodesic,
    /// Projected (or abstract) planar coordinates; shoelace area, Euclidean length.
    Planar,
}

/// Reasons a ring cannot be measured.
#[derive(Clone, Debug, PartialEq)]
pub enum MeasureError {
    /// Fewer than four coordinates, so not a closed ring around any area.
    EmptyRing,
    /// A coordinate or a computed quantity is NaN or infinite.
    NonFinite,
}

impl fmt::Display for MeasureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureError::EmptyRing => write!(f, "ring has fewer than four coordinates"),
            MeasureError::NonFinite => write!(f, "non-finite coordinate or measurement"),
        }
    }
}

impl std::error::Error for MeasureError {}

impl AreaModel {
    /// Area and length of one closed ring, in that order. Either winding
    /// measures the same.
    pub fn measure_ring(self, ring: &LineString<f64>) -> Result<(f64, f64), MeasureError> {
        if ring.0.len() < 4 { return Err(MeasureError::EmptyRing) }
        if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(MeasureError::NonFinite)
        }

        let (area, length) = match self {
            AreaModel::Geodesic => {
                // Geodesic area is the region left of the ring, so wind it CCW first.
                let (perimeter, area) = Polygon::new(ring.clone(), vec![])
                    .orient(Direction::Default)
                    .geodesic_perimeter_area_unsigned();
                (area, perimeter)
            }
            AreaModel::Planar => {
                let area = Polygon::new(ring.clone(), vec![]).unsigned_area();
                (area, Euclidean.length(ring))
            }
        };

        if !area.is_finite() || !length.is_finite() { return Err(MeasureError::NonFinite) }
        Ok((area, length))
    }

    /// Area of one closed ring.
    #[inline]
    pub fn ring_area(self, ring: &LineString<f64>) -> Result<f64, MeasureError> {
        self.measure_ring(ring).map(|(area, _)| area)
    }
}

/// Exterior-ring measurements of a shape. Interior rings (holes) never count.
pub trait Measured {
    /// Summed area of every exterior ring.
    fn exterior_area(&self, model: AreaModel) -> Result<f64, MeasureError>;

    /// Summed length of every exterior ring.
    fn exterior_perimeter(&self, model: AreaModel) -> Result<f64, MeasureError>;
}

impl Measured for Polygon<f64> {
    fn exterior_area(&self, model: AreaModel) -> Result<f64, MeasureError> {
        model.ring_area(self.exterior())
    }

    fn exterior_perimeter(&self, model: AreaModel) -> Result<f64, MeasureError> {
        model.measure_ring(self.exterior()).map(|(_, length)| length)
    }
}

impl Measured for MultiPolygon<f64> {
    fn exterior_area(&self, model: AreaModel) -> Result<f64, MeasureError> {
        if self.0.is_empty() { return Err(MeasureError::EmptyRing) }
        self.0.iter().map(|polygon| polygon.exterior_area(model)).sum()
    }

    fn exterior_perimeter(&self, model: AreaModel) -> Result<f64, MeasureError> {
        if self.0.is_empty() { return Err(MeasureError::EmptyRing) }
        self.0.iter().map(|polygon| polygon.exterior_perimeter(model)).sum()
    }
}

/// Axis-aligned bounding box over every coordinate of `shape`.
#[inline]
pub fn bounds(shape: &MultiPolygon<f64>) -> Option<Rect<f64>> {
    shape.bounding_rect()
}

/// Smallest rectangle containing both `a` and `b`.
#[inline]
pub fn merge_bounds(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

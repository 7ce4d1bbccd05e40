use std::f64::consts::PI;

use geo::Rect;
use serde::{Deserialize, Serialize};

use super::ShapeMeasure;

/// How close (in coordinate units, degrees for lon/lat) a district edge must
/// be to the district set's outer edge to count as touching it.
pub const BOUNDARY_TOLERANCE: f64 = 0.01;

const AT_BOUNDARY_WEIGHT: f64 = 0.3;
const ELONGATED_WEIGHT: f64 = 0.2;
const IRREGULAR_WEIGHT: f64 = 0.2;
const ELONGATED_ASPECT: f64 = 3.0;
const IRREGULAR_RATIO: f64 = 0.1;
const COASTAL_ASPECT: f64 = 2.0;
const COASTAL_RATIO: f64 = 0.08;

/// Which perimeter feeds the irregularity signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerimeterMode {
    /// `2·sqrt(π·area)`, the perimeter of a circle of the same area.
    #[default]
    Estimated,
    /// The measured exterior perimeter.
    Exact,
}

/// Inferred geographic context of a district's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryContext {
    pub has_coastline: bool,
    pub has_border: bool,
    /// Likelihood in `[0, 1]` that the boundary follows natural features.
    pub natural_boundary_percentage: f64,
}

impl BoundaryContext {
    /// No inferred natural boundary.
    pub const NONE: Self = Self { has_coastline: false, has_border: false, natural_boundary_percentage: 0.0 };
}

/// Shape and position signals from which the boundary context is inferred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSignals {
    /// Longer over shorter side of the district's bounding box.
    pub aspect_ratio: f64,
    /// Some bounding-box edge lies within `BOUNDARY_TOLERANCE` of the
    /// matching edge of the district set's bounding box.
    pub is_at_boundary: bool,
    /// `perimeter / sqrt(area)`.
    pub perimeter_to_area_ratio: f64,
}

impl ShapeSignals {
    pub fn new(district: Rect<f64>, global: Rect<f64>, measure: ShapeMeasure, mode: PerimeterMode) -> Self {
        let (width, height) = (district.width(), district.height());
        let aspect_ratio = width.max(height) / width.min(height);

        let near = |a: f64, b: f64| (a - b).abs() < BOUNDARY_TOLERANCE;
        let is_at_boundary = near(district.min().x, global.min().x)
            || near(district.max().x, global.max().x)
            || near(district.min().y, global.min().y)
            || near(district.max().y, global.max().y);

        let perimeter = match mode {
            PerimeterMode::Estimated => 2.0 * (PI * measure.area).sqrt(),
            PerimeterMode::Exact => measure.perimeter,
        };
        let perimeter_to_area_ratio = perimeter / measure.area.sqrt();

        Self { aspect_ratio, is_at_boundary, perimeter_to_area_ratio }
    }

    /// Apply the fixed boundary heuristics.
    pub fn boundary_context(&self) -> BoundaryContext {
        let mut natural = 0.0;
        if self.is_at_boundary { natural += AT_BOUNDARY_WEIGHT }
        if self.aspect_ratio > ELONGATED_ASPECT { natural += ELONGATED_WEIGHT }
        if self.perimeter_to_area_ratio > IRREGULAR_RATIO { natural += IRREGULAR_WEIGHT }

        BoundaryContext {
            has_coastline: self.is_at_boundary
                && (self.aspect_ratio > COASTAL_ASPECT || self.perimeter_to_area_ratio > COASTAL_RATIO),
            has_border: self.is_at_boundary,
            natural_boundary_percentage: f64::clamp(natural, 0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::Coord;

    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
    }

    #[test]
    fn elongated_border_district() {
        let signals = ShapeSignals { aspect_ratio: 4.0, is_at_boundary: true, perimeter_to_area_ratio: 0.05 };
        let context = signals.boundary_context();
        assert_eq!(context.natural_boundary_percentage, 0.5);
        assert!(context.has_border);
        assert!(context.has_coastline); // aspect ratio > 2
    }

    #[test]
    fn border_without_coast() {
        let signals = ShapeSignals { aspect_ratio: 1.5, is_at_boundary: true, perimeter_to_area_ratio: 0.05 };
        let context = signals.boundary_context();
        assert!(context.has_border && !context.has_coastline);
        assert_eq!(context.natural_boundary_percentage, 0.3);
    }

    #[test]
    fn interior_district_is_never_coastal() {
        let signals = ShapeSignals { aspect_ratio: 10.0, is_at_boundary: false, perimeter_to_area_ratio: 5.0 };
        let context = signals.boundary_context();
        assert!(!context.has_border && !context.has_coastline);
        assert!((context.natural_boundary_percentage - 0.4).abs() < 1e-12);
    }

    #[test]
    fn signals_from_bounding_boxes() {
        let global = rect(0.0, 0.0, 10.0, 10.0);
        let district = rect(0.005, 2.0, 4.005, 3.0);
        let measure = ShapeMeasure { area: 4.0, perimeter: 10.0 };

        let estimated = ShapeSignals::new(district, global, measure, PerimeterMode::Estimated);
        assert!(estimated.is_at_boundary);
        assert!((estimated.aspect_ratio - 4.0).abs() < 1e-9);
        assert!((estimated.perimeter_to_area_ratio - 2.0 * PI.sqrt()).abs() < 1e-12);

        let exact = ShapeSignals::new(district, global, measure, PerimeterMode::Exact);
        assert_eq!(exact.perimeter_to_area_ratio, 5.0);
    }

    #[test]
    fn edge_just_outside_tolerance_is_interior() {
        let global = rect(0.0, 0.0, 10.0, 10.0);
        let district = rect(0.02, 0.02, 9.98, 9.98);
        let measure = ShapeMeasure { area: 1.0, perimeter: 4.0 };
        assert!(!ShapeSignals::new(district, global, measure, PerimeterMode::Estimated).is_at_boundary);
    }

    #[test]
    fn zero_area_yields_no_irregularity() {
        let global = rect(0.0, 0.0, 10.0, 10.0);
        let district = rect(2.0, 2.0, 3.0, 3.0);
        let measure = ShapeMeasure { area: 0.0, perimeter: 0.0 };
        let context = ShapeSignals::new(district, global, measure, PerimeterMode::Estimated).boundary_context();
        assert_eq!(context, BoundaryContext::NONE);
    }
}

mod adjust;
mod compactness;
mod context;

use geo::{MultiPolygon, Rect};
use polymetric::{AreaModel, Measured};
use serde::{Deserialize, Serialize};

pub use adjust::adjust_score;
pub use compactness::{convex_hull_ratio, polsby_popper};
pub use context::{BoundaryContext, PerimeterMode, ShapeSignals, BOUNDARY_TOLERANCE};

/// Full compactness breakdown for one district.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactnessResult {
    /// `4π·area / perimeter²`, in `[0, 1]`.
    pub polsby_popper: f64,
    /// `area / hull area`, in `[0, 1]`; 0 when the hull is degenerate.
    pub convex_hull_ratio: f64,
    pub boundary_context: BoundaryContext,
    /// Polsby-Popper after boundary adjustments, in `[polsby_popper, 1]`.
    pub adjusted_score: f64,
}

impl CompactnessResult {
    /// Result for a district whose geometry could not be measured.
    pub const ZERO: Self = Self {
        polsby_popper: 0.0,
        convex_hull_ratio: 0.0,
        boundary_context: BoundaryContext::NONE,
        adjusted_score: 0.0,
    };
}

/// Area and perimeter of a shape's exterior rings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeMeasure {
    pub area: f64,
    pub perimeter: f64,
}

/// Scores district shapes under one measurement setup.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    model: AreaModel,
    perimeter_mode: PerimeterMode,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(AreaModel::Geodesic, PerimeterMode::Estimated)
    }
}

impl Scorer {
    pub fn new(model: AreaModel, perimeter_mode: PerimeterMode) -> Self {
        Self { model, perimeter_mode }
    }

    #[inline] pub fn model(&self) -> AreaModel { self.model }

    /// Full-resolution exterior area and perimeter. A shape that cannot be
    /// measured counts as zero area, which scores zero downstream.
    pub fn measure(&self, shape: &MultiPolygon<f64>) -> ShapeMeasure {
        let area = shape.exterior_area(self.model);
        let perimeter = shape.exterior_perimeter(self.model);
        match (area, perimeter) {
            (Ok(area), Ok(perimeter)) => ShapeMeasure { area, perimeter },
            (Err(e), _) | (_, Err(e)) => {
                tracing::debug!("degenerate district geometry: {e}");
                ShapeMeasure { area: 0.0, perimeter: 0.0 }
            }
        }
    }

    /// Raw Polsby-Popper score of a shape.
    pub fn polsby_popper(&self, shape: &MultiPolygon<f64>) -> f64 {
        let ShapeMeasure { area, perimeter } = self.measure(shape);
        polsby_popper(area, perimeter)
    }

    /// Full breakdown of a shape against the bounding box of its district set.
    /// A shape without measurable area scores [`CompactnessResult::ZERO`],
    /// boundary bonuses included.
    pub fn score(&self, shape: &MultiPolygon<f64>, global_bounds: Option<Rect<f64>>) -> CompactnessResult {
        let measure = self.measure(shape);
        if !(measure.area > 0.0) { return CompactnessResult::ZERO }

        let polsby_popper = polsby_popper(measure.area, measure.perimeter);
        let convex_hull_ratio = convex_hull_ratio(shape, measure.area, self.model, polymetric::DEFAULT_SAMPLE_CAP);

        let boundary_context = match (polymetric::bounds(shape), global_bounds) {
            (Some(district), Some(global)) => {
                ShapeSignals::new(district, global, measure, self.perimeter_mode).boundary_context()
            }
            _ => BoundaryContext::NONE,
        };

        CompactnessResult {
            polsby_popper,
            convex_hull_ratio,
            boundary_context,
            adjusted_score: adjust_score(polsby_popper, convex_hull_ratio, &boundary_context),
        }
    }
}

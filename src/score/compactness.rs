use std::f64::consts::PI;

use geo::MultiPolygon;
use polymetric::{close_ring, convex_hull, hull_ring, sample_ring, AreaModel, Measured};

/// Polsby-Popper compactness: `4π·area / perimeter²`, clamped to `[0, 1]`.
/// Zero when either input is zero (or not a positive number).
pub fn polsby_popper(area: f64, perimeter: f64) -> f64 {
    if !(area > 0.0) || !(perimeter > 0.0) { return 0.0 }
    (4.0 * PI * area / (perimeter * perimeter)).clamp(0.0, 1.0)
}

/// Ratio of the district's area to the area of the convex hull of its
/// largest exterior ring (sampled to `sample_cap` points).
///
/// Zero if the hull has fewer than three vertices or no area. Clamped to
/// `[0, 1]`: a MultiPolygon's full area can exceed the hull of its largest
/// part.
pub fn convex_hull_ratio(shape: &MultiPolygon<f64>, area: f64, model: AreaModel, sample_cap: usize) -> f64 {
    if !(area > 0.0) { return 0.0 }
    let Some(ring) = hull_ring(shape) else { return 0.0 };

    let points = sample_ring(ring, sample_cap);
    if points.len() < 3 { return 0.0 }

    let Some(hull) = close_ring(&convex_hull(&points)) else { return 0.0 };
    match hull.exterior_area(model) {
        Ok(hull_area) if hull_area > 0.0 => (area / hull_area).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

use super::BoundaryContext;

const COASTLINE_BONUS: f64 = 0.10;
const BORDER_BONUS: f64 = 0.05;
const IRREGULARITY_BONUS: f64 = 0.05;
const IRREGULAR_HULL_RATIO: f64 = 0.5;

/// Move a raw Polsby-Popper score toward 1 for districts whose irregular
/// shape is plausibly explained by natural boundaries.
///
/// Each step closes a fixed fraction of the remaining gap to 1, in order:
/// coastline (or else border), then an irregularity bonus for districts that
/// fill less than half their hull. The order and constants determine every
/// district's relative ranking.
pub fn adjust_score(polsby_popper: f64, convex_hull_ratio: f64, context: &BoundaryContext) -> f64 {
    let mut score = polsby_popper;

    if context.has_coastline {
        score += COASTLINE_BONUS * (1.0 - score);
    } else if context.has_border {
        score += BORDER_BONUS * (1.0 - score);
    }

    if convex_hull_ratio > 0.0 && convex_hull_ratio < IRREGULAR_HULL_RATIO {
        score += IRREGULARITY_BONUS * context.natural_boundary_percentage * (1.0 - score);
    }

    score.min(1.0)
}

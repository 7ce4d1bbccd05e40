use serde::{Deserialize, Serialize};

use crate::score::CompactnessResult;

/// Summary statistics over one batch's scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_districts: usize,
    pub average_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Population standard deviation; 0 for fewer than two scores.
    pub standard_deviation: f64,
}

impl Statistics {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() { return Self::default() }

        let n = scores.len() as f64;
        let average = scores.iter().sum::<f64>() / n;
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let standard_deviation = if scores.len() < 2 { 0.0 } else {
            (scores.iter().map(|x| (x - average).powi(2)).sum::<f64>() / n).sqrt()
        };

        Self {
            total_districts: scores.len(),
            average_score: average,
            min_score: min,
            max_score: max,
            standard_deviation,
        }
    }
}

/// Boundary-context counts over one enhanced batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicSummary {
    pub coastal_districts: usize,
    pub border_districts: usize,
    pub average_natural_boundary: f64,
}

impl GeographicSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a CompactnessResult>) -> Self {
        let mut summary = Self::default();
        let mut count = 0usize;
        let mut natural = 0.0;
        for result in results {
            let context = &result.boundary_context;
            count += 1;
            summary.coastal_districts += context.has_coastline as usize;
            summary.border_districts += context.has_border as usize;
            natural += context.natural_boundary_percentage;
        }
        if count > 0 { summary.average_natural_boundary = natural / count as f64 }
        summary
    }
}

#[cfg(test)]
mod tests {
    use crate::score::BoundaryContext;

    use super::*;

    #[test]
    fn three_district_scenario() {
        let stats = Statistics::from_scores(&[0.2, 0.5, 0.9]);
        assert_eq!(stats.total_districts, 3);
        assert!((stats.average_score - 1.6 / 3.0).abs() < 1e-12);
        assert_eq!(stats.min_score, 0.2);
        assert_eq!(stats.max_score, 0.9);
        assert!((stats.standard_deviation - 0.2867).abs() < 1e-3);
    }

    #[test]
    fn single_score_has_no_spread() {
        let stats = Statistics::from_scores(&[0.42]);
        assert_eq!(stats.standard_deviation, 0.0);
        assert_eq!(stats.min_score, 0.42);
        assert_eq!(stats.max_score, 0.42);
    }

    #[test]
    fn empty_scores_are_all_zero() {
        assert_eq!(Statistics::from_scores(&[]), Statistics::default());
    }

    #[test]
    fn geographic_summary_counts() {
        let with = |has_coastline, has_border, natural| CompactnessResult {
            boundary_context: BoundaryContext { has_coastline, has_border, natural_boundary_percentage: natural },
            ..CompactnessResult::ZERO
        };
        let results = [with(true, true, 0.7), with(false, true, 0.3), with(false, false, 0.2)];
        let summary = GeographicSummary::from_results(&results);
        assert_eq!(summary.coastal_districts, 1);
        assert_eq!(summary.border_districts, 2);
        assert!((summary.average_natural_boundary - 0.4).abs() < 1e-12);
    }
}

//! Outlier-adjusted distances
//!
//! A low distance matters more when it stands out from everything else
//! each submission scores. For every submission the distances to all the
//! others form a row; the row's mean and the spread of the values below
//! that mean say how unusual one close pair is. The adjusted distance
//! shrinks a pair's distance by up to `importance` when both submissions
//! see each other as outliers.

use ahash::AHashMap;

use super::DistanceResult;

/// Mean and left-side standard deviation of one submission's row
#[derive(Debug, Clone, Copy, PartialEq)]
struct RowStats {
    mean: f64,
    side_std_dev: f64,
}

impl RowStats {
    fn of(row: &[f64]) -> Self {
        if row.is_empty() {
            return Self {
                mean: 0.0,
                side_std_dev: 0.0,
            };
        }
        let mean = row.iter().sum::<f64>() / row.len() as f64;
        let below: Vec<f64> = row.iter().copied().filter(|&d| d < mean).collect();
        let side_std_dev = if below.is_empty() {
            0.0
        } else {
            (below.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / below.len() as f64)
                .sqrt()
        };
        Self { mean, side_std_dev }
    }

    /// Left-side deviations of `distance` below this row's mean
    fn deviations(&self, distance: f64) -> f64 {
        let gap = (self.mean - distance).max(0.0);
        if gap == 0.0 || self.side_std_dev == 0.0 {
            0.0
        } else {
            gap / self.side_std_dev
        }
    }
}

/// Adjusted distance for every result, in the order given.
///
/// `importance` is clamped to `[0, 1]`; at 0 every distance is returned
/// unchanged. Rows only contain pairs present in `results`, so a partial
/// result set adjusts against what was computed.
pub fn outlier_adjusted(results: &[DistanceResult], importance: f64) -> Vec<f64> {
    let importance = importance.clamp(0.0, 1.0);

    let mut rows: AHashMap<&str, Vec<f64>> = AHashMap::new();
    for r in results {
        rows.entry(r.a.as_str()).or_default().push(r.distance);
        rows.entry(r.b.as_str()).or_default().push(r.distance);
    }
    let stats: AHashMap<&str, RowStats> = rows
        .iter()
        .map(|(id, row)| (*id, RowStats::of(row)))
        .collect();

    results
        .iter()
        .map(|r| {
            let (Some(sa), Some(sb)) = (stats.get(r.a.as_str()), stats.get(r.b.as_str())) else {
                return r.distance;
            };
            let a_in_b = sb.deviations(r.distance);
            let b_in_a = sa.deviations(r.distance);
            let dispersion = 2f64.powf(-(a_in_b * b_in_a));
            (dispersion * importance + (1.0 - importance)) * r.distance
        })
        .collect()
}

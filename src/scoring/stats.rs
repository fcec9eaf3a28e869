// src/scoring/stats.rs — Cross-sectional population statistics
//
// Population (not sample) standard deviation, order-statistic quartiles, and
// a normal-CDF percentile built on the Abramowitz-Stegun erf approximation.

use serde::{Deserialize, Serialize};

/// Summary of a cross-sectional set of values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
}

/// Compute summary statistics over `values`.
///
/// Expects a clean population (see [`clean_population`]). An empty slice
/// yields the all-zero record.
pub fn stats(values: &[f64]) -> PopulationStats {
    if values.is_empty() {
        return PopulationStats::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    PopulationStats {
        mean,
        std_dev: variance.sqrt(),
        median,
        min: sorted[0],
        max: sorted[n - 1],
        p25: sorted[quartile_index(n, 0.25)],
        p75: sorted[quartile_index(n, 0.75)],
    }
}

fn quartile_index(n: usize, q: f64) -> usize {
    ((n as f64 * q).floor() as usize).min(n - 1)
}

/// Drop non-finite values, and zeros when zero marks "no data".
pub fn clean_population(values: &[f64], zero_is_missing: bool) -> Vec<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .filter(|v| !(zero_is_missing && *v == 0.0))
        .collect()
}

/// Standard score of `value`; 0 when the population has no spread.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 0.0;
    }
    (value - mean) / std_dev
}

/// Percentile (0-100) of `value` under a normal distribution.
///
/// A zero-variance population puts every value at the 50th percentile.
pub fn z_percentile(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 50.0;
    }
    let z = (value - mean) / std_dev;
    (normal_cdf(z) * 100.0).clamp(0.0, 100.0)
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Error function, Abramowitz & Stegun formula 7.1.26 (|ε| ≤ 1.5e-7).
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}

// src/forecast/mod.rs — Trend + mean-reversion score forecasting
//
// A deterministic heuristic shaped like a structural time-series forecast:
// OLS trend, a decaying structural adjustment from the series' own
// first-to-last momentum, optional pull toward a long-run target, and bands
// that widen with horizon. There is no posterior sampling or factor
// extraction; the constants below are behavioral, not estimated.

pub mod jitter;

use serde::{Deserialize, Serialize};

/// Minimum history length for a forecast.
pub const MIN_HISTORY: usize = 3;

/// Share of the remaining gap to the target closed per forecast year.
const REVERSION_RATE: f64 = 0.1;
/// Weight of the momentum-vs-trend gap in the structural adjustment.
const STRUCTURAL_WEIGHT: f64 = 0.5;
/// Per-year decay of the structural adjustment.
const STRUCTURAL_DECAY: f64 = 0.9;
/// Bound on the structural gap, in score points per year.
const STRUCTURAL_CAP: f64 = 2.0;

const Z_80: f64 = 1.28;
const Z_95: f64 = 1.96;

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub predicted: f64,
    pub lower80: f64,
    pub upper80: f64,
    pub lower95: f64,
    pub upper95: f64,
}

impl ForecastPoint {
    pub fn width80(&self) -> f64 {
        self.upper80 - self.lower80
    }

    pub fn width95(&self) -> f64 {
        self.upper95 - self.lower95
    }
}

/// Ordinary-least-squares line over `index 0..n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFit {
    pub intercept: f64,
    pub slope: f64,
    pub residual_std: f64,
}

impl TrendFit {
    pub fn at(&self, index: f64) -> f64 {
        self.intercept + self.slope * index
    }
}

/// Fit `value = intercept + slope * index`; residual std uses `n - 2`
/// degrees of freedom. Requires at least [`MIN_HISTORY`] values.
pub fn fit_trend(values: &[f64]) -> Option<TrendFit> {
    let n = values.len();
    if n < MIN_HISTORY {
        return None;
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / nf;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ssr: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (intercept + slope * i as f64)).powi(2))
        .sum();

    Some(TrendFit {
        intercept,
        slope,
        residual_std: (ssr / (nf - 2.0)).sqrt(),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Forecaster {
    /// Floor for the residual std so residual-free histories still get
    /// horizon-widening bands.
    min_residual_std: f64,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Forecaster {
    pub fn new(min_residual_std: f64) -> Self {
        Self {
            min_residual_std: min_residual_std.max(0.0),
        }
    }

    /// Project `horizon` years past `last_year`.
    ///
    /// `history` holds one score per year ending at `last_year`. Fewer than
    /// [`MIN_HISTORY`] points yields an empty forecast. Inputs are assumed
    /// finite.
    pub fn forecast(
        &self,
        history: &[f64],
        last_year: i32,
        horizon: u32,
        mean_reversion_target: Option<f64>,
    ) -> Vec<ForecastPoint> {
        let Some(fit) = fit_trend(history) else {
            return Vec::new();
        };

        let n = history.len() as f64;
        let spread = fit.residual_std.max(self.min_residual_std);
        let structural_gap = structural_gap(history, fit.slope);

        (1..=horizon)
            .map(|h| {
                let hf = h as f64;
                let trend = fit.at(n - 1.0 + hf);
                let structural =
                    structural_gap * STRUCTURAL_WEIGHT * STRUCTURAL_DECAY.powi(h as i32 - 1);

                let mut predicted = trend + structural;
                if let Some(target) = mean_reversion_target {
                    let pull = (REVERSION_RATE * hf).min(1.0);
                    predicted += (target - predicted) * pull;
                }

                // Bands are centred on the clamped point so a trend running
                // past a bound keeps a widening interval on the open side.
                let predicted = clamp_score(predicted);
                let half = spread * (1.0 + hf / n).sqrt();
                ForecastPoint {
                    year: last_year + h as i32,
                    predicted,
                    lower80: clamp_score(predicted - Z_80 * half),
                    upper80: clamp_score(predicted + Z_80 * half),
                    lower95: clamp_score(predicted - Z_95 * half),
                    upper95: clamp_score(predicted + Z_95 * half),
                }
            })
            .collect()
    }
}

/// Average first-to-last change minus the fitted slope, bounded.
fn structural_gap(history: &[f64], slope: f64) -> f64 {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return 0.0;
    };
    let steps = (history.len() - 1) as f64;
    ((last - first) / steps - slope).clamp(-STRUCTURAL_CAP, STRUCTURAL_CAP)
}

fn clamp_score(v: f64) -> f64 {
    v.clamp(SCORE_MIN, SCORE_MAX)
}

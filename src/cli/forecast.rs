// src/cli/forecast.rs — `resilience forecast`

use chrono::Datelike;

use crate::core::ResilienceEngine;
use crate::forecast::jitter::decorate_with_jitter;
use crate::forecast::MIN_HISTORY;

pub struct ForecastArgs {
    pub values: Vec<f64>,
    pub last_year: Option<i32>,
    pub horizon: Option<u32>,
    pub target: Option<f64>,
    pub jitter: Option<f64>,
}

pub fn run_forecast(engine: &ResilienceEngine, args: ForecastArgs) -> anyhow::Result<()> {
    if let Some(bad) = args.values.iter().find(|v| !v.is_finite()) {
        anyhow::bail!("history values must be finite, got {bad}");
    }
    if let Some(target) = args.target {
        if !(0.0..=100.0).contains(&target) {
            anyhow::bail!("--target must be within 0-100, got {target}");
        }
    }

    let last_year = args
        .last_year
        .unwrap_or_else(|| chrono::Utc::now().year() - 1);
    let horizon = args
        .horizon
        .unwrap_or(engine.config().forecast.horizon_years);
    let target = args
        .target
        .or(engine.config().forecast.mean_reversion_target);

    let points = engine.forecast(&args.values, last_year, horizon, target);
    if points.is_empty() {
        eprintln!(
            "Need at least {MIN_HISTORY} values to forecast (got {})",
            args.values.len()
        );
    }

    let output = match args.jitter {
        Some(amplitude) => decorate_with_jitter(&points, amplitude),
        None => points.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// src/forecast/jitter.rs — Display-only random jitter for forecast charts
//
// Not part of the forecasting contract: nothing in the scoring or
// forecasting path calls this. It shifts each point (and its bands) by a
// uniform offset so rendered series look less mechanical.

use super::ForecastPoint;

/// Shift every point by an independent uniform offset in `[-amplitude, amplitude]`,
/// drawn from the OS random source. Points are returned unchanged if no
/// randomness is available.
pub fn decorate_with_jitter(points: &[ForecastPoint], amplitude: f64) -> Vec<ForecastPoint> {
    let mut failed = false;
    let decorated = decorate_with(points, amplitude, || match os_unit() {
        Some(u) => u,
        None => {
            failed = true;
            0.5
        }
    });
    if failed {
        tracing::debug!("OS randomness unavailable; forecast jitter skipped");
        return points.to_vec();
    }
    decorated
}

/// Same as [`decorate_with_jitter`] with a caller-supplied source of
/// uniform `[0, 1)` samples.
pub fn decorate_with(
    points: &[ForecastPoint],
    amplitude: f64,
    mut unit: impl FnMut() -> f64,
) -> Vec<ForecastPoint> {
    let amplitude = amplitude.abs();
    points
        .iter()
        .map(|p| {
            let offset = (unit() * 2.0 - 1.0) * amplitude;
            let shift = |v: f64| (v + offset).clamp(0.0, 100.0);
            ForecastPoint {
                year: p.year,
                predicted: shift(p.predicted),
                lower80: shift(p.lower80),
                upper80: shift(p.upper80),
                lower95: shift(p.lower95),
                upper95: shift(p.upper95),
            }
        })
        .collect()
}

/// Uniform sample in `[0, 1)` from 53 random bits.
fn os_unit() -> Option<f64> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).ok()?;
    let bits = u64::from_le_bytes(buf) >> 11;
    Some(bits as f64 / (1u64 << 53) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: i32, predicted: f64) -> ForecastPoint {
        ForecastPoint {
            year,
            predicted,
            lower80: predicted - 2.0,
            upper80: predicted + 2.0,
            lower95: predicted - 3.0,
            upper95: predicted + 3.0,
        }
    }

    #[test]
    fn test_midpoint_sample_is_identity() {
        let points = vec![point(2025, 50.0), point(2026, 51.0)];
        assert_eq!(decorate_with(&points, 4.0, || 0.5), points);
    }

    #[test]
    fn test_offset_applies_to_whole_point() {
        let points = vec![point(2025, 50.0)];
        let shifted = decorate_with(&points, 4.0, || 1.0);
        assert_eq!(shifted[0].predicted, 54.0);
        assert_eq!(shifted[0].lower95, 51.0);
        assert_eq!(shifted[0].year, 2025);
    }

    #[test]
    fn test_jitter_stays_in_range_and_bounded() {
        let points: Vec<_> = (0..50).map(|i| point(2025 + i, 50.0)).collect();
        let decorated = decorate_with_jitter(&points, 3.0);
        assert_eq!(decorated.len(), points.len());
        for (orig, d) in points.iter().zip(&decorated) {
            assert!((d.predicted - orig.predicted).abs() <= 3.0 + 1e-9);
            assert!(d.lower95 <= d.predicted && d.predicted <= d.upper95);
        }
    }

    #[test]
    fn test_clamped_at_score_edges() {
        let points = vec![point(2025, 99.0)];
        let shifted = decorate_with(&points, 10.0, || 1.0);
        assert_eq!(shifted[0].upper95, 100.0);
        assert_eq!(shifted[0].predicted, 100.0);
    }
}

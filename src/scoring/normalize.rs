// src/scoring/normalize.rs — Raw indicator value → 0-100 scale

/// Map `value` from the `[min, max]` domain onto 0-100.
///
/// Values outside the domain are clamped first. With `invert` set, a larger
/// raw value means worse resilience and the result is flipped.
///
/// Domains are validated when the catalog is built (`max > min`); a
/// degenerate domain yields 0 instead of dividing by zero.
pub fn normalize(value: f64, min: f64, max: f64, invert: bool) -> f64 {
    let span = max - min;
    if !(span > 0.0) {
        return 0.0;
    }

    let clamped = value.clamp(min, max);
    let scaled = ((clamped - min) / span * 100.0).clamp(0.0, 100.0);

    if invert {
        100.0 - scaled
    } else {
        scaled
    }
}

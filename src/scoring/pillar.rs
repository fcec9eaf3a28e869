// src/scoring/pillar.rs — Weighted pillar aggregation with coverage tracking

use std::collections::BTreeMap;

use futures::future::join_all;

use super::normalize::normalize;
use super::{IndicatorDescriptor, IndicatorValue, PillarScore, ResolvedIndicator};
use crate::sources::resolver::{IndicatorResolver, PopulationCell};

/// Resolve every descriptor concurrently and fold the results into a pillar score.
pub async fn aggregate(
    resolver: &IndicatorResolver,
    country_code: &str,
    country_name: &str,
    descriptors: &[IndicatorDescriptor],
) -> PillarScore {
    let population = PopulationCell::new();

    let values = join_all(
        descriptors
            .iter()
            .map(|d| resolver.resolve(country_code, country_name, d, &population)),
    )
    .await;

    let pillar = score_resolved(descriptors, &values);

    tracing::debug!(
        country = country_code,
        score = pillar.score,
        coverage = pillar.coverage,
        missing = pillar.missing().len(),
        "Pillar aggregated"
    );

    pillar
}

/// Combine already-resolved values (same order as `descriptors`).
///
/// The score is renormalized over the weight that actually resolved, so a
/// missing low-weight indicator distorts the result less than a missing
/// high-weight one. Absent indicators are still listed, with `value: None`.
pub fn score_resolved(
    descriptors: &[IndicatorDescriptor],
    values: &[IndicatorValue],
) -> PillarScore {
    let configured_weight: f64 = descriptors.iter().map(|d| d.weight).sum();

    let mut weighted_sum = 0.0;
    let mut available_weight = 0.0;
    let mut indicators = BTreeMap::new();

    for (i, d) in descriptors.iter().enumerate() {
        let resolved = values.get(i).copied().unwrap_or_default();
        let value = resolved.value.filter(|v| v.is_finite());
        let normalized = value.map(|v| normalize(v, d.min, d.max, d.invert));

        if let Some(n) = normalized {
            weighted_sum += d.weight * n;
            available_weight += d.weight;
        }

        indicators.insert(
            d.id.to_string(),
            ResolvedIndicator {
                label: d.label.to_string(),
                source: d.source.kind().to_string(),
                weight: d.weight,
                value,
                year: value.and(resolved.year),
                normalized,
            },
        );
    }

    let score = if available_weight > 0.0 {
        (weighted_sum / available_weight).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let coverage = if configured_weight > 0.0 {
        (available_weight / configured_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    PillarScore {
        score,
        coverage,
        indicators,
    }
}

// src/scoring/mod.rs — Indicator descriptors, resolved values, pillar and model scores

pub mod catalog;
pub mod normalize;
pub mod pillar;
pub mod stats;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The four resilience dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    Social,
    Economic,
    Institutional,
    Infrastructure,
}

impl Pillar {
    pub const ALL: [Pillar; 4] = [
        Pillar::Social,
        Pillar::Economic,
        Pillar::Institutional,
        Pillar::Infrastructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::Social => "social",
            Pillar::Economic => "economic",
            Pillar::Institutional => "institutional",
            Pillar::Infrastructure => "infrastructure",
        }
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an indicator's raw value comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorSource {
    /// A development-indicator time series, keyed by series code.
    StatisticalSeries { code: &'static str },
    /// A governance index series, keyed by series code.
    GovernanceIndex { code: &'static str },
    /// Number of matching events for a country-scoped keyword query.
    EventCount { keywords: &'static str },
}

impl IndicatorSource {
    pub fn kind(&self) -> &'static str {
        match self {
            IndicatorSource::StatisticalSeries { .. } => "statistical-series",
            IndicatorSource::GovernanceIndex { .. } => "governance-index",
            IndicatorSource::EventCount { .. } => "event-count",
        }
    }
}

/// Static configuration for one indicator within a pillar.
///
/// Weights are relative: the aggregator renormalizes over whatever weight
/// actually resolved, so a pillar's weights need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub source: IndicatorSource,
    pub min: f64,
    pub max: f64,
    pub weight: f64,
    /// Larger raw values mean worse resilience.
    pub invert: bool,
    /// Rescale event counts to events per million inhabitants.
    pub per_capita: bool,
}

/// A resolved observation for one country/indicator pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValue {
    pub value: Option<f64>,
    pub year: Option<i32>,
}

impl IndicatorValue {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn observed(value: f64, year: Option<i32>) -> Self {
        Self {
            value: Some(value),
            year,
        }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some_and(f64::is_finite)
    }
}

/// One indicator as recorded in a pillar result, present or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIndicator {
    pub label: String,
    pub source: String,
    pub weight: f64,
    pub value: Option<f64>,
    pub year: Option<i32>,
    /// 0-100 score, present only when `value` is.
    pub normalized: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    pub score: f64,
    /// Fraction of configured weight that resolved to a real value.
    pub coverage: f64,
    pub indicators: BTreeMap<String, ResolvedIndicator>,
}

impl PillarScore {
    /// Ids of indicators that could not be resolved.
    pub fn missing(&self) -> Vec<&str> {
        self.indicators
            .iter()
            .filter(|(_, ind)| ind.value.is_none())
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// A country's full resilience result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub country_code: String,
    pub country_name: String,
    pub social: PillarScore,
    pub economic: PillarScore,
    pub institutional: PillarScore,
    pub infrastructure: PillarScore,
    /// Unweighted mean of the four pillar scores.
    pub overall: f64,
    pub generated_at: DateTime<Utc>,
}

impl ModelScore {
    pub fn new(
        country_code: impl Into<String>,
        country_name: impl Into<String>,
        social: PillarScore,
        economic: PillarScore,
        institutional: PillarScore,
        infrastructure: PillarScore,
    ) -> Self {
        let overall =
            (social.score + economic.score + institutional.score + infrastructure.score) / 4.0;
        Self {
            country_code: country_code.into(),
            country_name: country_name.into(),
            social,
            economic,
            institutional,
            infrastructure,
            overall,
            generated_at: Utc::now(),
        }
    }

    pub fn pillar(&self, pillar: Pillar) -> &PillarScore {
        match pillar {
            Pillar::Social => &self.social,
            Pillar::Economic => &self.economic,
            Pillar::Institutional => &self.institutional,
            Pillar::Infrastructure => &self.infrastructure,
        }
    }

    /// Mean coverage across the four pillars.
    pub fn coverage(&self) -> f64 {
        Pillar::ALL
            .iter()
            .map(|p| self.pillar(*p).coverage)
            .sum::<f64>()
            / 4.0
    }
}

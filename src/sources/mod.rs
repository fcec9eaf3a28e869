// src/sources/mod.rs — External data collaborators
//
// Remote payloads are validated into typed observations at this boundary;
// everything above it works with `Option` fields instead of raw JSON.

pub mod gdelt;
pub mod resolver;
pub mod world_bank;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infra::errors::Result;

/// Which family of series an indicator code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// World Development Indicators and similar statistical series.
    Development,
    /// Worldwide Governance Indicators.
    Governance,
}

/// One dated point of a statistical series. `value` is `None` for years the
/// publisher lists without data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    pub value: Option<f64>,
}

/// A single event (news article) returned by the event search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub url: String,
    pub title: Option<String>,
    pub seen_at: Option<String>,
    pub source_country: Option<String>,
}

/// Source of statistical time series, used for both plain and governance
/// indicators and for population lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatisticalSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// All observations for `(country_code, indicator_code)`, in any order.
    async fn fetch_series(
        &self,
        country_code: &str,
        indicator_code: &str,
        dataset: Dataset,
    ) -> Result<Vec<Observation>>;
}

/// Keyword event search; the number of returned records is the signal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_events(&self, query: &str) -> Result<Vec<EventRecord>>;
}

/// Most recent observation with a finite value, as `(value, year)`.
pub fn latest_observation(observations: &[Observation]) -> Option<(f64, i32)> {
    observations
        .iter()
        .filter_map(|o| o.value.filter(|v| v.is_finite()).map(|v| (v, o.year)))
        .max_by_key(|(_, year)| *year)
}

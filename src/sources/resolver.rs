// src/sources/resolver.rs — Indicator resolution against the external collaborators
//
// Every failure (timeout, HTTP status, malformed payload) is contained here
// and turned into an absent value for that single indicator. A transient
// failure is retried once inside the same fetch timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use super::{latest_observation, Dataset, EventSource, StatisticalSource};
use crate::infra::errors::{ResilienceError, Result};
use crate::scoring::catalog::POPULATION_CODE;
use crate::scoring::{IndicatorDescriptor, IndicatorSource, IndicatorValue};

/// Population shared by all indicators of one pillar computation; fetched at
/// most once, on first use.
pub type PopulationCell = OnceCell<Option<f64>>;

/// Pause before the single retry of a transient failure.
const RETRY_DELAY: Duration = Duration::from_millis(250);

pub struct IndicatorResolver {
    statistics: Arc<dyn StatisticalSource>,
    events: Arc<dyn EventSource>,
    fetch_timeout: Duration,
}

impl IndicatorResolver {
    pub fn new(
        statistics: Arc<dyn StatisticalSource>,
        events: Arc<dyn EventSource>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            statistics,
            events,
            fetch_timeout,
        }
    }

    /// Resolve one indicator for a country. Never fails: unavailable data
    /// comes back as [`IndicatorValue::absent`].
    pub async fn resolve(
        &self,
        country_code: &str,
        country_name: &str,
        descriptor: &IndicatorDescriptor,
        population: &PopulationCell,
    ) -> IndicatorValue {
        let outcome = match descriptor.source {
            IndicatorSource::StatisticalSeries { code } => {
                self.latest(country_code, code, Dataset::Development).await
            }
            IndicatorSource::GovernanceIndex { code } => {
                self.latest(country_code, code, Dataset::Governance).await
            }
            IndicatorSource::EventCount { keywords } => {
                let per_capita = descriptor.per_capita;
                self.event_count(country_code, country_name, keywords, per_capita, population)
                    .await
            }
        };

        match outcome {
            Ok(value) => {
                if !value.is_present() {
                    tracing::debug!(
                        country = country_code,
                        indicator = descriptor.id,
                        "No observation available"
                    );
                }
                value
            }
            Err(e) => {
                tracing::warn!(
                    country = country_code,
                    indicator = descriptor.id,
                    "Indicator unavailable: {}",
                    e
                );
                IndicatorValue::absent()
            }
        }
    }

    /// Latest population figure, or `None` when it cannot be obtained.
    pub async fn population(&self, country_code: &str) -> Option<f64> {
        match self.latest(country_code, POPULATION_CODE, Dataset::Development).await {
            Ok(IndicatorValue {
                value: Some(population),
                ..
            }) if population > 0.0 => Some(population),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(country = country_code, "Population unavailable: {}", e);
                None
            }
        }
    }

    async fn latest(
        &self,
        country_code: &str,
        indicator_code: &str,
        dataset: Dataset,
    ) -> Result<IndicatorValue> {
        let observations = self
            .bounded(self.statistics.name(), move || {
                self.statistics
                    .fetch_series(country_code, indicator_code, dataset)
            })
            .await?;

        Ok(latest_observation(&observations)
            .map(|(value, year)| IndicatorValue::observed(value, Some(year)))
            .unwrap_or_default())
    }

    async fn event_count(
        &self,
        country_code: &str,
        country_name: &str,
        keywords: &str,
        per_capita: bool,
        population: &PopulationCell,
    ) -> Result<IndicatorValue> {
        let query = event_query(country_name, keywords);
        let query = query.as_str();
        let events = self
            .bounded(self.events.name(), move || self.events.fetch_events(query))
            .await?;
        let count = events.len() as f64;

        if !per_capita {
            return Ok(IndicatorValue::observed(count, None));
        }

        let population = *population
            .get_or_init(|| self.population(country_code))
            .await;

        let value = match population {
            Some(p) => per_million(count, p),
            None => {
                tracing::debug!(
                    country = country_code,
                    "No population figure; leaving event count unscaled"
                );
                count
            }
        };
        Ok(IndicatorValue::observed(value, None))
    }

    /// Run `fetch` under the fetch timeout, retrying once after a transient
    /// failure if the budget allows.
    async fn bounded<T, F, Fut>(&self, source_name: &str, fetch: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = async {
            match fetch().await {
                Err(e) if e.is_transient() => {
                    tracing::debug!(
                        source = source_name,
                        delay_ms = RETRY_DELAY.as_millis() as u64,
                        "Retrying after error: {}",
                        e
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                    fetch().await
                }
                outcome => outcome,
            }
        };

        match tokio::time::timeout(self.fetch_timeout, attempts).await {
            Ok(result) => result,
            Err(_) => Err(ResilienceError::Timeout {
                source_name: source_name.to_string(),
                after: self.fetch_timeout,
            }),
        }
    }
}

/// Country-scoped event query: `"<name>" (<keywords>)`.
pub fn event_query(country_name: &str, keywords: &str) -> String {
    format!("\"{}\" ({})", country_name.trim(), keywords.trim())
}

/// Events per million inhabitants.
pub fn per_million(count: f64, population: f64) -> f64 {
    count * 1_000_000.0 / population
}

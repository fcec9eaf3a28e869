// src/core/engine.rs — Resilience engine: cached model scores, forecasts, benchmarks

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::core::cache::ValueCache;
use crate::forecast::{ForecastPoint, Forecaster};
use crate::infra::config::Config;
use crate::scoring::catalog::Catalog;
use crate::scoring::pillar::aggregate;
use crate::scoring::stats::{clean_population, stats, z_percentile, z_score, PopulationStats};
use crate::scoring::{ModelScore, Pillar};
use crate::sources::gdelt::GdeltClient;
use crate::sources::resolver::IndicatorResolver;
use crate::sources::world_bank::WorldBankClient;
use crate::sources::{EventSource, StatisticalSource};

/// One country's position within a benchmark population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkEntry {
    pub code: String,
    pub name: String,
    pub overall: f64,
    /// `None` when the country had no data (overall score of zero).
    pub z_score: Option<f64>,
    pub percentile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Benchmark {
    pub population: PopulationStats,
    /// Ranked by percentile, highest first; countries without data last.
    pub entries: Vec<BenchmarkEntry>,
}

pub struct ResilienceEngine {
    resolver: IndicatorResolver,
    catalog: Catalog,
    model_cache: ValueCache<ModelScore>,
    forecast_cache: ValueCache<Vec<ForecastPoint>>,
    forecaster: Forecaster,
    config: Config,
}

impl ResilienceEngine {
    pub fn new(
        statistics: Arc<dyn StatisticalSource>,
        events: Arc<dyn EventSource>,
        config: &Config,
    ) -> Self {
        Self {
            resolver: IndicatorResolver::new(statistics, events, config.sources.fetch_timeout()),
            catalog: Catalog::standard(),
            model_cache: ValueCache::new(),
            forecast_cache: ValueCache::new(),
            forecaster: Forecaster::new(config.forecast.min_residual_std),
            config: config.clone(),
        }
    }

    /// Engine backed by the live World Bank and GDELT clients.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let engine = Self::new(
            Arc::new(WorldBankClient::from_config(&config.sources)),
            Arc::new(GdeltClient::from_config(&config.sources)),
            config,
        );
        engine.catalog.validate()?;
        Ok(engine)
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Score a country on all four pillars. Served from the model cache when
    /// a result younger than its TTL exists; scores with low coverage get the
    /// short degraded TTL.
    ///
    /// The name feeds the event-search phrase, so it is part of the cache key.
    pub async fn model_score(&self, country_code: &str, country_name: &str) -> Arc<ModelScore> {
        let code = country_code.trim().to_uppercase();
        let name = country_name.trim();
        let key = model_key(&code, name);

        self.model_cache
            .get_or_insert_with(
                &key,
                || self.compute_model_score(&code, name),
                |model| self.config.cache.model_ttl_for(model.coverage()),
            )
            .await
    }

    async fn compute_model_score(&self, code: &str, name: &str) -> ModelScore {
        let pillar =
            move |p: Pillar| aggregate(&self.resolver, code, name, self.catalog.descriptors(p));

        let (social, economic, institutional, infrastructure) = tokio::join!(
            pillar(Pillar::Social),
            pillar(Pillar::Economic),
            pillar(Pillar::Institutional),
            pillar(Pillar::Infrastructure),
        );

        let model = ModelScore::new(code, name, social, economic, institutional, infrastructure);
        tracing::info!(
            country = code,
            overall = model.overall,
            coverage = model.coverage(),
            "Model score computed"
        );
        model
    }

    /// Forecast a score history, memoized on (history, last_year, horizon,
    /// target) for the forecast TTL.
    pub fn forecast(
        &self,
        history: &[f64],
        last_year: i32,
        horizon: u32,
        mean_reversion_target: Option<f64>,
    ) -> Arc<Vec<ForecastPoint>> {
        let key = forecast_key(history, last_year, horizon, mean_reversion_target);
        if let Some(hit) = self.forecast_cache.get(&key) {
            return hit;
        }
        // Keys are unbounded (any history), so sweep stale ones on each miss.
        let purged = self.forecast_cache.purge_expired();
        if purged > 0 {
            tracing::debug!(purged, "Expired forecasts dropped");
        }

        let points = self
            .forecaster
            .forecast(history, last_year, horizon, mean_reversion_target);
        if points.is_empty() {
            tracing::debug!(history = history.len(), "History too short to forecast");
        }
        self.forecast_cache
            .set(key, points, self.config.cache.forecast_ttl())
    }

    /// Forecast with the configured default horizon and target.
    pub fn forecast_default(&self, history: &[f64], last_year: i32) -> Arc<Vec<ForecastPoint>> {
        self.forecast(
            history,
            last_year,
            self.config.forecast.horizon_years,
            self.config.forecast.mean_reversion_target,
        )
    }

    /// Score each `(code, name)` pair and rank the overall scores against
    /// each other. Countries scoring exactly zero are treated as having no
    /// data and excluded from the population.
    pub async fn benchmark(&self, countries: &[(String, String)]) -> Benchmark {
        let scores = join_all(
            countries
                .iter()
                .map(|(code, name)| self.model_score(code, name)),
        )
        .await;

        let overalls: Vec<f64> = scores.iter().map(|m| m.overall).collect();
        let population = stats(&clean_population(&overalls, true));

        let mut entries: Vec<BenchmarkEntry> = scores
            .iter()
            .map(|m| {
                let has_data = m.overall.is_finite() && m.overall != 0.0;
                BenchmarkEntry {
                    code: m.country_code.clone(),
                    name: m.country_name.clone(),
                    overall: m.overall,
                    z_score: has_data
                        .then(|| z_score(m.overall, population.mean, population.std_dev)),
                    percentile: has_data
                        .then(|| z_percentile(m.overall, population.mean, population.std_dev)),
                }
            })
            .collect();

        entries.sort_by(|a, b| match (a.percentile, b.percentile) {
            (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.code.cmp(&b.code)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.code.cmp(&b.code),
        });

        Benchmark {
            population,
            entries,
        }
    }

    /// Drop a cached model score so the next call recomputes it.
    pub fn invalidate_model(&self, country_code: &str, country_name: &str) -> bool {
        let key = model_key(&country_code.trim().to_uppercase(), country_name.trim());
        self.model_cache.invalidate(&key)
    }

    /// Evict expired entries from both caches.
    pub fn purge_expired(&self) -> usize {
        self.model_cache.purge_expired() + self.forecast_cache.purge_expired()
    }
}

fn model_key(code: &str, name: &str) -> String {
    format!("model:{code}:{name}")
}

fn forecast_key(history: &[f64], last_year: i32, horizon: u32, target: Option<f64>) -> String {
    let mut hasher = DefaultHasher::new();
    for v in history {
        v.to_bits().hash(&mut hasher);
    }
    target.map(f64::to_bits).hash(&mut hasher);
    format!(
        "forecast:{last_year}:{horizon}:{}:{:016x}",
        history.len(),
        hasher.finish()
    )
}

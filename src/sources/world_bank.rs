// src/sources/world_bank.rs — World Bank indicator API adapter (v2, JSON)
//
// Responses are a two-element array: `[page_meta, [ {date, value, ...}, ... ]]`.
// Errors come back with HTTP 200 as `[{"message": [...]}]`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Semaphore;
use url::Url;

use super::{Dataset, Observation, StatisticalSource};
use crate::infra::config::SourcesConfig;
use crate::infra::errors::{ResilienceError, Result};

const SOURCE_NAME: &str = "world_bank";
/// WGI lives in World Bank data source 3.
const GOVERNANCE_SOURCE_ID: &str = "3";
/// Enough rows to cover every year since 1960 in a single page.
const PAGE_SIZE: &str = "100";

pub struct WorldBankClient {
    client: Client,
    base_url: String,
    permits: Arc<Semaphore>,
}

impl WorldBankClient {
    pub fn new(base_url: impl Into<String>, max_concurrent: usize) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn from_config(config: &SourcesConfig) -> Self {
        Self::new(
            config.world_bank_base_url.clone(),
            config.max_concurrent_requests,
        )
    }

    fn series_url(&self, country_code: &str, indicator_code: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ResilienceError::Config(format!("invalid World Bank base URL: {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|_| ResilienceError::Config("World Bank base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["country", country_code, "indicator", indicator_code]);
        Ok(url)
    }
}

#[async_trait]
impl StatisticalSource for WorldBankClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_series(
        &self,
        country_code: &str,
        indicator_code: &str,
        dataset: Dataset,
    ) -> Result<Vec<Observation>> {
        let url = self.series_url(country_code, indicator_code)?;

        let mut query = vec![("format", "json"), ("per_page", PAGE_SIZE)];
        if dataset == Dataset::Governance {
            query.push(("source", GOVERNANCE_SOURCE_ID));
        }

        let _permit = self.permits.acquire().await.map_err(|e| ResilienceError::Source {
            source_name: SOURCE_NAME.into(),
            message: format!("request limiter closed: {e}"),
            transient: false,
        })?;

        tracing::debug!(country = country_code, indicator = indicator_code, "Fetching series");
        let resp = self.client.get(url).query(&query).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ResilienceError::Status {
                source_name: SOURCE_NAME.into(),
                status,
                body,
            });
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| ResilienceError::Decode {
            source_name: SOURCE_NAME.into(),
            message: e.to_string(),
        })?;

        parse_series_payload(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SeriesPoint {
    date: String,
    value: Option<f64>,
}

/// Decode a World Bank series response body into observations.
pub fn parse_series_payload(body: &serde_json::Value) -> Result<Vec<Observation>> {
    let parts = body.as_array().ok_or_else(|| ResilienceError::Decode {
        source_name: SOURCE_NAME.into(),
        message: "expected a top-level array".into(),
    })?;

    if let Some(message) = parts.first().and_then(|meta| meta.get("message")) {
        return Err(ResilienceError::Source {
            source_name: SOURCE_NAME.into(),
            message: message.to_string(),
            transient: false,
        });
    }

    // No rows: `[meta]` or `[meta, null]`
    let points = match parts.get(1) {
        Some(points) if !points.is_null() => points,
        _ => return Ok(Vec::new()),
    };

    let points: Vec<SeriesPoint> =
        serde_json::from_value(points.clone()).map_err(|e| ResilienceError::Decode {
            source_name: SOURCE_NAME.into(),
            message: e.to_string(),
        })?;

    Ok(points
        .into_iter()
        .filter_map(|p| {
            parse_year(&p.date).map(|year| Observation {
                year,
                value: p.value,
            })
        })
        .collect())
}

/// Dates are "2022", or "2022Q1"/"2022M01" for sub-annual series.
fn parse_year(date: &str) -> Option<i32> {
    date.get(..4)?.parse().ok()
}

// src/sources/gdelt.rs — GDELT DOC 2.0 article search adapter
//
// `mode=artlist&format=json` returns `{"articles": [...]}`, or `{}` when
// nothing matched. Query syntax errors come back as plain text with HTTP 200.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Semaphore;

use super::{EventRecord, EventSource};
use crate::infra::config::SourcesConfig;
use crate::infra::errors::{ResilienceError, Result};

const SOURCE_NAME: &str = "gdelt";

pub struct GdeltClient {
    client: Client,
    base_url: String,
    timespan: String,
    max_records: u32,
    permits: Arc<Semaphore>,
}

impl GdeltClient {
    pub fn new(base_url: impl Into<String>, max_concurrent: usize) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timespan: "3months".into(),
            max_records: 250,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn from_config(config: &SourcesConfig) -> Self {
        Self::new(config.gdelt_base_url.clone(), config.max_concurrent_requests)
            .with_window(config.event_timespan.clone(), config.event_max_records)
    }

    pub fn with_window(mut self, timespan: impl Into<String>, max_records: u32) -> Self {
        self.timespan = timespan.into();
        self.max_records = max_records;
        self
    }
}

#[async_trait]
impl EventSource for GdeltClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_events(&self, query: &str) -> Result<Vec<EventRecord>> {
        let max_records = self.max_records.to_string();
        let params = [
            ("query", query),
            ("mode", "artlist"),
            ("format", "json"),
            ("maxrecords", max_records.as_str()),
            ("timespan", self.timespan.as_str()),
        ];

        let _permit = self.permits.acquire().await.map_err(|e| ResilienceError::Source {
            source_name: SOURCE_NAME.into(),
            message: format!("request limiter closed: {e}"),
            transient: false,
        })?;

        tracing::debug!(query, "Searching events");
        let resp = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ResilienceError::Status {
                source_name: SOURCE_NAME.into(),
                status,
                body,
            });
        }

        let text = resp.text().await?;
        parse_artlist(&text)
    }
}

#[derive(Debug, Deserialize)]
struct ArtList {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    url: String,
    title: Option<String>,
    seendate: Option<String>,
    sourcecountry: Option<String>,
}

/// Decode an artlist body. Non-JSON bodies are GDELT's plain-text errors.
pub fn parse_artlist(text: &str) -> Result<Vec<EventRecord>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let list: ArtList = serde_json::from_str(trimmed).map_err(|_| ResilienceError::Decode {
        source_name: SOURCE_NAME.into(),
        message: trimmed.chars().take(200).collect(),
    })?;

    Ok(list
        .articles
        .into_iter()
        .map(|a| EventRecord {
            url: a.url,
            title: a.title,
            seen_at: a.seendate,
            source_country: a.sourcecountry,
        })
        .collect())
}

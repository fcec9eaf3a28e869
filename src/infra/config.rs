// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::infra::errors::ResilienceError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub model_ttl_hours: u64,
    pub forecast_ttl_minutes: u64,
    /// Scores with mean pillar coverage below this are cached only for
    /// `degraded_ttl_seconds`, so an upstream outage is not pinned for hours.
    pub degraded_coverage: f64,
    pub degraded_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            model_ttl_hours: 6,
            forecast_ttl_minutes: 60,
            degraded_coverage: 0.5,
            degraded_ttl_seconds: 60,
        }
    }
}

impl CacheConfig {
    pub fn model_ttl(&self) -> Duration {
        Duration::from_secs(self.model_ttl_hours * 3600)
    }

    /// TTL for a model score with the given mean coverage.
    pub fn model_ttl_for(&self, coverage: f64) -> Duration {
        if coverage < self.degraded_coverage {
            Duration::from_secs(self.degraded_ttl_seconds)
        } else {
            self.model_ttl()
        }
    }

    pub fn forecast_ttl(&self) -> Duration {
        Duration::from_secs(self.forecast_ttl_minutes * 60)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub world_bank_base_url: String,
    pub gdelt_base_url: String,
    pub fetch_timeout_seconds: u64,
    pub max_concurrent_requests: usize,
    /// GDELT timespan expression, e.g. "3months" or "1y".
    pub event_timespan: String,
    pub event_max_records: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            world_bank_base_url: "https://api.worldbank.org/v2".into(),
            gdelt_base_url: "https://api.gdeltproject.org/api/v2/doc/doc".into(),
            fetch_timeout_seconds: 8,
            max_concurrent_requests: 8,
            event_timespan: "3months".into(),
            event_max_records: 250,
        }
    }
}

impl SourcesConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub horizon_years: u32,
    /// Lower bound applied to the residual standard deviation so that a
    /// perfectly linear history still produces widening bands.
    pub min_residual_std: f64,
    #[serde(default)]
    pub mean_reversion_target: Option<f64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_years: 6,
            min_residual_std: 0.5,
            mean_reversion_target: None,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ResilienceError> {
        if self.sources.max_concurrent_requests == 0 {
            return Err(ResilienceError::Config(
                "sources.max_concurrent_requests must be at least 1".into(),
            ));
        }
        if self.sources.fetch_timeout_seconds == 0 {
            return Err(ResilienceError::Config(
                "sources.fetch_timeout_seconds must be at least 1".into(),
            ));
        }
        for (name, raw) in [
            ("world_bank_base_url", &self.sources.world_bank_base_url),
            ("gdelt_base_url", &self.sources.gdelt_base_url),
        ] {
            url::Url::parse(raw).map_err(|e| {
                ResilienceError::Config(format!("sources.{name} is not a valid URL: {e}"))
            })?;
        }
        if !(self.forecast.min_residual_std >= 0.0) {
            return Err(ResilienceError::Config(
                "forecast.min_residual_std must be non-negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.cache.degraded_coverage) {
            return Err(ResilienceError::Config(
                "cache.degraded_coverage must be within 0-1".into(),
            ));
        }
        if let Some(target) = self.forecast.mean_reversion_target {
            if !(0.0..=100.0).contains(&target) {
                return Err(ResilienceError::Config(format!(
                    "forecast.mean_reversion_target {target} is outside 0-100"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert_eq!(c.cache.model_ttl_hours, 6);
        assert_eq!(c.cache.model_ttl(), Duration::from_secs(6 * 3600));
        assert_eq!(c.sources.fetch_timeout(), Duration::from_secs(8));
        assert_eq!(c.forecast.horizon_years, 6);
        assert!((c.forecast.min_residual_std - 0.5).abs() < 1e-9);
        assert!(c.forecast.mean_reversion_target.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_degraded_scores_get_short_ttl() {
        let c = CacheConfig::default();
        assert_eq!(c.model_ttl_for(0.0), Duration::from_secs(60));
        assert_eq!(c.model_ttl_for(0.49), Duration::from_secs(60));
        assert_eq!(c.model_ttl_for(0.5), c.model_ttl());
        assert_eq!(c.model_ttl_for(1.0), c.model_ttl());
    }

    #[test]
    fn test_validate_rejects_bad_degraded_coverage() {
        let mut c = Config::default();
        c.cache.degraded_coverage = 1.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_parse_partial_cache_section() {
        let config: Config = toml::from_str("[cache]\nmodel_ttl_hours = 2\n").unwrap();
        assert_eq!(config.cache.model_ttl_hours, 2);
        assert_eq!(config.cache.degraded_ttl_seconds, 60);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.sources.max_concurrent_requests, 8);
        assert_eq!(config.cache.forecast_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[cache]
model_ttl_hours = 12
forecast_ttl_minutes = 5

[sources]
world_bank_base_url = "http://localhost:9000/v2"
gdelt_base_url = "http://localhost:9001/doc"
fetch_timeout_seconds = 3
max_concurrent_requests = 2
event_timespan = "1y"
event_max_records = 50

[forecast]
horizon_years = 10
min_residual_std = 0.0
mean_reversion_target = 55.0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cache.model_ttl_hours, 12);
        assert_eq!(config.sources.max_concurrent_requests, 2);
        assert_eq!(config.sources.event_timespan, "1y");
        assert_eq!(config.forecast.horizon_years, 10);
        assert_eq!(config.forecast.mean_reversion_target, Some(55.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut c = Config::default();
        c.sources.max_concurrent_requests = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut c = Config::default();
        c.sources.gdelt_base_url = "not a url".into();
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("gdelt_base_url"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_target() {
        let mut c = Config::default();
        c.forecast.mean_reversion_target = Some(140.0);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nmodel_ttl_hours = 1\nforecast_ttl_minutes = 1").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.cache.model_ttl_hours, 1);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(
            deserialized.sources.world_bank_base_url,
            config.sources.world_bank_base_url
        );
    }
}

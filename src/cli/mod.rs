// src/cli/mod.rs — CLI definition (clap derive)

pub mod benchmark;
pub mod forecast;
pub mod score;

use clap::{Parser, Subcommand};

use crate::scoring::catalog::Catalog;

#[derive(Parser)]
#[command(
    name = "resilience",
    about = "Country resilience scoring and forecasting",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a country on the four resilience pillars
    Score {
        /// ISO3 country code (e.g. KEN)
        code: String,
        /// Country name used for event queries (defaults to the code, with a
        /// warning when the catalog has event indicators)
        #[arg(long)]
        name: Option<String>,
    },
    /// Forecast a yearly score history
    Forecast {
        /// Scores, oldest first, one per year
        #[arg(required = true, num_args = 1..)]
        values: Vec<f64>,
        /// Year of the last value (defaults to last calendar year)
        #[arg(long)]
        last_year: Option<i32>,
        /// Years to project (defaults to forecast.horizon_years)
        #[arg(long)]
        horizon: Option<u32>,
        /// Long-run score to revert toward (0-100)
        #[arg(long)]
        target: Option<f64>,
        /// Add display jitter of up to this many points
        #[arg(long)]
        jitter: Option<f64>,
    },
    /// Score several countries and rank them against each other
    Benchmark {
        /// Countries as CODE or CODE=Name
        #[arg(required = true, num_args = 1..)]
        countries: Vec<String>,
    },
}

/// Split `CODE=Name` into its parts; a bare code doubles as the name.
pub fn parse_country(arg: &str) -> (String, String) {
    match arg.split_once('=') {
        Some((code, name)) if !name.trim().is_empty() => {
            (code.trim().to_uppercase(), name.trim().to_string())
        }
        Some((code, _)) => {
            let code = code.trim().to_uppercase();
            (code.clone(), code)
        }
        None => {
            let code = arg.trim().to_uppercase();
            (code.clone(), code)
        }
    }
}

/// Warning for a country scored without a name: event searches then use the
/// code itself as the country phrase.
pub fn unnamed_country_warning(catalog: &Catalog, code: &str) -> Option<String> {
    catalog.has_event_indicators().then(|| {
        format!(
            "warning: no name given for {code}; event searches will use \"{code}\" as the \
             country phrase and likely find nothing"
        )
    })
}

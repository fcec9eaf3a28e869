// src/main.rs — resilience entry point

use clap::Parser;

use resilience::cli::forecast::ForecastArgs;
use resilience::cli::{Cli, Commands};
use resilience::core::ResilienceEngine;
use resilience::infra::config::Config;
use resilience::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Respects RUST_LOG when set
    logger::init_logging(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Falls back to defaults if no config.toml
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    let engine = ResilienceEngine::from_config(&config)?;

    match cli.command {
        Commands::Score { code, name } => {
            resilience::cli::score::run_score(&engine, &code, name.as_deref()).await
        }
        Commands::Forecast {
            values,
            last_year,
            horizon,
            target,
            jitter,
        } => resilience::cli::forecast::run_forecast(
            &engine,
            ForecastArgs {
                values,
                last_year,
                horizon,
                target,
                jitter,
            },
        ),
        Commands::Benchmark { countries } => {
            resilience::cli::benchmark::run_benchmark(&engine, &countries).await
        }
    }
}

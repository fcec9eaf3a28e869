// src/cli/benchmark.rs — `resilience benchmark`

use super::{parse_country, unnamed_country_warning};
use crate::core::ResilienceEngine;

pub async fn run_benchmark(engine: &ResilienceEngine, countries: &[String]) -> anyhow::Result<()> {
    let countries: Vec<(String, String)> = countries.iter().map(|c| parse_country(c)).collect();
    for (code, name) in &countries {
        if code == name {
            if let Some(warning) = unnamed_country_warning(engine.catalog(), code) {
                eprintln!("{warning}");
            }
        }
    }
    let benchmark = engine.benchmark(&countries).await;

    for entry in &benchmark.entries {
        match entry.percentile {
            Some(p) => eprintln!("  {:<4} {:>6.1}  p{:>3.0}", entry.code, entry.overall, p),
            None => eprintln!("  {:<4}    n/a  (no data)", entry.code),
        }
    }

    println!("{}", serde_json::to_string_pretty(&benchmark)?);
    Ok(())
}

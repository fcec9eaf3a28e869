// src/cli/score.rs — `resilience score`

use super::unnamed_country_warning;
use crate::core::ResilienceEngine;
use crate::scoring::Pillar;

pub async fn run_score(
    engine: &ResilienceEngine,
    code: &str,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => {
            if let Some(warning) = unnamed_country_warning(engine.catalog(), code) {
                eprintln!("{warning}");
            }
            code
        }
    };
    let model = engine.model_score(code, name).await;

    for pillar in Pillar::ALL {
        let p = model.pillar(pillar);
        let missing = p.missing();
        if !missing.is_empty() {
            eprintln!(
                "  {:<15} coverage {:>4.0}%  missing: {}",
                pillar,
                p.coverage * 100.0,
                missing.join(", ")
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&*model)?);
    Ok(())
}

//! Scores customer records from a JSON file without starting the server.
//!
//! Usage: `score_records <records.json>`
//!
//! The file holds either one record object or an array of them, using the
//! same field names as the JSON API. Artifacts are located the same way as
//! for the service (`ARTIFACTS_DIR`, `MODEL_PATH`, ...).

use anyhow::Context;
use churn_predict_api::{artifacts, config::Config, models::parse_records};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: score_records <records.json>"))?;

    let config = Config::from_env()?;
    let loaded = artifacts::load(&config)?;

    let contents =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path))?;
    let records = parse_records(&contents)
        .with_context(|| format!("failed to parse records in {}", path))?;

    println!("=== Churn Scoring: {} record(s) ===\n", records.len());

    let mut failures = 0;
    for (idx, outcome) in loaded.context.predict_batch(&records).into_iter().enumerate() {
        match outcome {
            Ok(result) => println!(
                "[{}] {}  {}",
                idx + 1,
                result.display_probability(),
                result.message()
            ),
            Err(e) => {
                failures += 1;
                println!("[{}] error: {}", idx + 1, e);
            }
        }
    }

    if failures > 0 {
        println!("\n{} record(s) could not be scored", failures);
    }

    Ok(())
}

//! Utility to inspect a trained model file and score a sample observation.
//!
//! Usage: `inspect_model [MODEL_PATH]` (falls back to the `MODEL_PATH` env var).

use anyhow::Context;
use dotenvy::dotenv;
use floodguard_risk::engine::{self, RiskScorer, TrainedModelScorer};
use floodguard_risk::model::ForestModel;
use floodguard_risk::model_integrity;
use floodguard_risk::models::WeatherObservation;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let path = env::args()
        .nth(1)
        .or_else(|| env::var("MODEL_PATH").ok())
        .context("Pass a model path or set MODEL_PATH")?;

    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;

    println!("Model file: {}", path);
    println!("  sha256: {}", model_integrity::compute_checksum(&bytes));

    let model = ForestModel::from_slice(&bytes)?;
    println!("  version: {}", model.version());
    println!("  features: {}", model.features().join(", "));
    println!("  trees: {}", model.tree_count());

    let sample = WeatherObservation {
        temperature: Some(2.0),
        humidity: Some(90.0),
        precipitation: Some(15.0),
        wind_speed: Some(25.0),
    };

    let scorer = TrainedModelScorer::new(Arc::new(model));
    let trained = engine::assess(&scorer, &sample);
    let heuristic = engine::assess(&engine::HeuristicScorer, &sample);

    println!();
    println!("Sample observation: {:?}", sample);
    println!(
        "  trained ({}): {:.2} {}",
        scorer.version(),
        trained.risk_score,
        trained.risk_level
    );
    println!(
        "  heuristic: {:.2} {}",
        heuristic.risk_score, heuristic.risk_level
    );
    for factor in &trained.factors {
        println!("  - {}", factor);
    }

    Ok(())
}

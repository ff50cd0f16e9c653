//! Risk scoring strategies.
//!
//! A [`RiskScorer`] turns an observation into a score. The heuristic scorer is
//! always available; the trained model scorer wraps a loaded [`ForestModel`].
//! The strategy is picked once at startup by [`select_scorer`] and shared by
//! all request handlers.

use crate::config::Config;
use crate::model::{self, ForestModel, FEATURE_NAMES};
use crate::models::{ModelStatus, RiskAssessment, WeatherObservation};
use crate::scoring;
use std::path::Path;
use std::sync::Arc;

/// Version string reported when no trained model is loaded.
pub const HEURISTIC_VERSION: &str = "heuristic-1.0.0";

/// Produces a flood risk score in [0, 100] for an observation.
pub trait RiskScorer: Send + Sync {
    /// Scores an observation. Implementations must clamp to [0, 100].
    fn predict(&self, observation: &WeatherObservation) -> f64;

    /// Whether this scorer is backed by a trained model.
    fn is_available(&self) -> bool;

    /// Short identifier reported in status responses.
    fn strategy(&self) -> &'static str;

    fn version(&self) -> &str;

    fn status(&self) -> ModelStatus {
        ModelStatus {
            strategy: self.strategy().to_string(),
            trained: self.is_available(),
            version: self.version().to_string(),
            trees: 0,
            features: FEATURE_NAMES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Additive weather heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl RiskScorer for HeuristicScorer {
    fn predict(&self, observation: &WeatherObservation) -> f64 {
        scoring::compute_score(observation)
    }

    fn is_available(&self) -> bool {
        false
    }

    fn strategy(&self) -> &'static str {
        "heuristic"
    }

    fn version(&self) -> &str {
        HEURISTIC_VERSION
    }
}

/// Scorer backed by a trained regression forest.
///
/// The model needs every feature; observations with missing readings are
/// scored by the heuristic instead.
#[derive(Debug, Clone)]
pub struct TrainedModelScorer {
    model: Arc<ForestModel>,
}

impl TrainedModelScorer {
    pub fn new(model: Arc<ForestModel>) -> Self {
        Self { model }
    }
}

impl RiskScorer for TrainedModelScorer {
    fn predict(&self, observation: &WeatherObservation) -> f64 {
        match observation.feature_vector() {
            Some(features) => scoring::clamp_score(self.model.predict(&features)),
            None => {
                tracing::debug!("Incomplete observation, falling back to heuristic score");
                scoring::compute_score(observation)
            }
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    fn strategy(&self) -> &'static str {
        "trained_model"
    }

    fn version(&self) -> &str {
        self.model.version()
    }

    fn status(&self) -> ModelStatus {
        ModelStatus {
            strategy: self.strategy().to_string(),
            trained: true,
            version: self.model.version().to_string(),
            trees: self.model.tree_count(),
            features: self.model.features().to_vec(),
        }
    }
}

/// Picks the trained model when one is loaded, the heuristic otherwise.
pub fn select_scorer(model: Option<ForestModel>) -> Arc<dyn RiskScorer> {
    match model {
        Some(model) => {
            tracing::info!("Using trained model scorer (version {})", model.version());
            Arc::new(TrainedModelScorer::new(Arc::new(model)))
        }
        None => {
            tracing::info!("No trained model available, using heuristic scorer");
            Arc::new(HeuristicScorer)
        }
    }
}

/// Loads the configured model and picks the scorer for it.
///
/// A missing path or file selects the heuristic. Any other load failure is
/// logged as a warning and also selects the heuristic.
pub async fn load_scorer(config: &Config) -> Arc<dyn RiskScorer> {
    let model = match config.model_path.as_deref() {
        Some(path) => {
            match model::load_model(Path::new(path), config.model_sha256.as_deref()).await {
                Ok(model) => model,
                Err(e) => {
                    tracing::warn!("Could not load trained model: {:#}", e);
                    None
                }
            }
        }
        None => None,
    };

    select_scorer(model)
}

/// Scores, classifies and explains an observation.
pub fn assess(scorer: &dyn RiskScorer, observation: &WeatherObservation) -> RiskAssessment {
    let risk_score = scorer.predict(observation);
    RiskAssessment {
        risk_score,
        risk_level: scoring::classify(risk_score),
        factors: scoring::explain(observation, risk_score),
    }
}

//! Trained flood risk model.
//!
//! A model file is a JSON-serialized regression forest with the standard
//! scaler it was fitted with. Loading validates the structure once; after
//! that the model is immutable and shared across requests behind an `Arc`.

use crate::model_integrity;
use anyhow::{bail, Context};
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Feature order expected by every model file.
pub const FEATURE_NAMES: [&str; 4] = ["temperature", "humidity", "precipitation", "wind_speed"];

/// Standard scaler parameters, one entry per feature.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// A single node of a regression tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go left when `x[feature] <= threshold`, right otherwise.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A regression tree stored as a flat node list rooted at index 0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn predict(&self, features: &[f64; 4]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    fn validate(&self, tree_index: usize) -> anyhow::Result<()> {
        if self.nodes.is_empty() {
            bail!("tree {} has no nodes", tree_index);
        }

        // Children must point forward, which rules out cycles.
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_NAMES.len() {
                        bail!("tree {} node {}: feature index {} out of range", tree_index, i, feature);
                    }
                    if !threshold.is_finite() {
                        bail!("tree {} node {}: threshold is not finite", tree_index, i);
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            bail!("tree {} node {}: invalid child index {}", tree_index, i, child);
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        bail!("tree {} node {}: leaf value is not finite", tree_index, i);
                    }
                }
            }
        }

        Ok(())
    }
}

/// On-disk layout of a model file, before validation.
#[derive(Debug, Deserialize)]
struct ForestModelFile {
    version: String,
    features: Vec<String>,
    scaler: Scaler,
    trees: Vec<RegressionTree>,
}

/// A validated regression forest fitted on standardized weather features.
///
/// Every instance has passed structural validation, so prediction never
/// indexes out of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestModel {
    version: String,
    features: Vec<String>,
    scaler: Scaler,
    trees: Vec<RegressionTree>,
}

impl<'de> Deserialize<'de> for ForestModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let file = ForestModelFile::deserialize(deserializer)?;
        let model = ForestModel {
            version: file.version,
            features: file.features,
            scaler: file.scaler,
            trees: file.trees,
        };
        model.validate().map_err(serde::de::Error::custom)?;
        Ok(model)
    }
}

impl ForestModel {
    /// Parses and validates a model from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> anyhow::Result<Self> {
        serde_json::from_slice(bytes).context("Failed to parse model file")
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Checks feature order, scaler dimensions and tree structure.
    fn validate(&self) -> anyhow::Result<()> {
        if self.features.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            bail!(
                "model features must be {:?}, got {:?}",
                FEATURE_NAMES,
                self.features
            );
        }

        let dims = FEATURE_NAMES.len();
        if self.scaler.mean.len() != dims || self.scaler.scale.len() != dims {
            bail!("scaler must have {} mean and scale entries", dims);
        }
        if self.scaler.mean.iter().any(|m| !m.is_finite()) {
            bail!("scaler mean entries must be finite");
        }
        if self.scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            bail!("scaler scale entries must be finite and non-zero");
        }

        if self.trees.is_empty() {
            bail!("model has no trees");
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }

        Ok(())
    }

    fn standardize(&self, features: &[f64; 4]) -> [f64; 4] {
        let mut scaled = [0.0; 4];
        for (i, value) in features.iter().enumerate() {
            scaled[i] = (value - self.scaler.mean[i]) / self.scaler.scale[i];
        }
        scaled
    }

    /// Averages the tree outputs for raw (unscaled) features.
    ///
    /// The result is not clamped.
    pub fn predict(&self, features: &[f64; 4]) -> f64 {
        let scaled = self.standardize(features);
        let total: f64 = self.trees.iter().map(|tree| tree.predict(&scaled)).sum();
        total / self.trees.len() as f64
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// Loads a model from disk.
///
/// Returns `Ok(None)` when the file does not exist. When `expected_sha256` is
/// given the raw file bytes must match it before parsing.
pub async fn load_model(
    path: &Path,
    expected_sha256: Option<&str>,
) -> anyhow::Result<Option<ForestModel>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No model file at {}", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read model file {}", path.display()))
        }
    };

    let checksum = model_integrity::compute_checksum(&bytes);
    match expected_sha256 {
        Some(expected) => {
            if !model_integrity::is_valid(&bytes, expected) {
                bail!("model file {} failed checksum validation", path.display());
            }
        }
        None => tracing::debug!("Model file {} sha256: {}", path.display(), checksum),
    }

    let model = ForestModel::from_slice(&bytes)?;
    tracing::info!(
        "Loaded model version {} ({} trees) from {}",
        model.version,
        model.tree_count(),
        path.display()
    );

    Ok(Some(model))
}

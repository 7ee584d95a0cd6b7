//! Trained model artifacts.
//!
//! Training happens offline; this module only loads the exported artifact and evaluates it. The
//! artifact is a JSON document tagged by `kind`:
//!
//! ```json
//! { "kind": "linear", "intercept": 50.0, "coefficients": [0.8, 0.6, 0.4, -0.1] }
//! ```
//!
//! ```json
//! { "kind": "forest", "trees": [ { "nodes": [
//!     { "split": { "feature": 0, "threshold": 50.0, "left": 1, "right": 2 } },
//!     { "leaf": 120.0 },
//!     { "leaf": 240.0 }
//! ] } ] }
//! ```

use super::features::FeatureVector;
use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A loaded regression model: one scalar out per feature vector in.
///
/// Implementations are immutable after loading and shared across callers.
pub trait ModelArtifact: Send + Sync {
    /// Predict downtime in milliseconds.
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Serialized artifact formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArtifactSpec {
    Linear(LinearModel),
    Forest(ForestModel),
}

impl ArtifactSpec {
    /// Read and decode an artifact file.
    ///
    /// Any failure is a [`PredictorError::DegradedMode`]: the caller is expected to fall back.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PredictorError::DegradedMode(format!(
                "model file not found at {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PredictorError::DegradedMode(format!("failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            PredictorError::DegradedMode(format!("failed to decode {}: {}", path.display(), e))
        })
    }

    /// Turn the decoded spec into a shareable model handle.
    pub fn into_artifact(self) -> Arc<dyn ModelArtifact> {
        match self {
            ArtifactSpec::Linear(model) => Arc::new(model),
            ArtifactSpec::Forest(model) => Arc::new(model),
        }
    }
}

/// Load an artifact file into a model handle.
pub fn load_artifact(path: &Path) -> Result<Arc<dyn ModelArtifact>> {
    ArtifactSpec::from_file(path).map(ArtifactSpec::into_artifact)
}

/// `intercept + Σ coefficients[i] * x[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl ModelArtifact for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if self.coefficients.len() != features.len() {
            return Err(PredictorError::Inference(format!(
                "shape mismatch: model has {} coefficients, got {} features",
                self.coefficients.len(),
                features.len()
            )));
        }

        let value = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.as_slice())
                .map(|(c, x)| c * x)
                .sum::<f64>();

        finite_output(value)
    }

    fn describe(&self) -> String {
        format!("linear({} coefficients)", self.coefficients.len())
    }
}

/// Averaged ensemble of regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<RegressionTree>,
}

impl ModelArtifact for ForestModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(PredictorError::Inference("forest has no trees".into()));
        }

        let mut total = 0.0;
        for (i, tree) in self.trees.iter().enumerate() {
            total += tree
                .evaluate(features)
                .map_err(|e| PredictorError::Inference(format!("tree {}: {}", i, e)))?;
        }

        finite_output(total / self.trees.len() as f64)
    }

    fn describe(&self) -> String {
        format!("forest({} trees)", self.trees.len())
    }
}

/// A regression tree stored as a flat node array; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, else `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

impl RegressionTree {
    fn evaluate(&self, features: &FeatureVector) -> std::result::Result<f64, String> {
        let mut index = 0;

        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| format!("node index {} out of range", index))?;

            match node {
                TreeNode::Leaf(value) => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features
                        .get(*feature)
                        .ok_or_else(|| format!("feature index {} out of range", feature))?;
                    index = if x <= *threshold { *left } else { *right };
                }
            }
        }

        Err("traversal did not reach a leaf (cycle)".to_string())
    }
}

fn finite_output(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PredictorError::Inference(format!(
            "model produced a non-finite value: {}",
            value
        )))
    }
}

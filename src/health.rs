//! Health reporting for prediction backends.
//!
//! The report mirrors what the prediction service publishes on `GET /health`, so the in-process
//! and remote backends answer the campaign pre-flight check with the same shape.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Model loaded, predictions are model-backed.
    Healthy,
    /// Serving heuristic predictions only.
    Degraded,
    /// Not able to serve predictions.
    Unhealthy,
}

impl HealthStatus {
    /// Whether predictions can be requested.
    pub fn is_operational(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy)
    }
}

/// Health of a prediction backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Whether a trained artifact is serving predictions.
    pub model_loaded: bool,
    /// Where the artifact was looked up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    /// RFC 3339 time of the check.
    pub timestamp: String,
}

impl HealthReport {
    /// Report for a backend serving predictions, degraded when no model is loaded.
    pub fn serving(model_loaded: bool, model_path: &Path) -> Self {
        Self {
            status: if model_loaded {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            model_loaded,
            model_path: Some(model_path.display().to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

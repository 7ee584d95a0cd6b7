//! Core types shared by the prediction engine, the simulator and campaigns.

use crate::error::{PredictorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence reported by the model-backed prediction path.
pub const MODEL_CONFIDENCE: f64 = 0.85;

/// Confidence reported by the heuristic prediction path.
pub const HEURISTIC_CONFIDENCE: f64 = 0.75;

/// A snapshot of the four runtime metrics that drive a downtime prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    /// CPU load in percent.
    pub cpu_load: f64,
    /// Memory usage in percent.
    pub memory_usage: f64,
    /// Disk I/O in MB/s.
    pub disk_io: f64,
    /// Network bandwidth in Mbps.
    pub network_bandwidth: f64,
}

impl MetricReading {
    pub fn new(cpu_load: f64, memory_usage: f64, disk_io: f64, network_bandwidth: f64) -> Self {
        Self {
            cpu_load,
            memory_usage,
            disk_io,
            network_bandwidth,
        }
    }

    /// Decode a reading from untyped JSON.
    ///
    /// Missing and non-numeric fields are reported as validation errors naming the field.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| PredictorError::Validation("metric reading must be an object".into()))?;

        let field = |name: &str| -> Result<f64> {
            match object.get(name) {
                None | Some(serde_json::Value::Null) => {
                    Err(PredictorError::Validation(format!("missing field `{}`", name)))
                }
                Some(v) => v.as_f64().ok_or_else(|| {
                    PredictorError::Validation(format!("field `{}` is not numeric: {}", name, v))
                }),
            }
        };

        Ok(Self {
            cpu_load: field("cpu_load")?,
            memory_usage: field("memory_usage")?,
            disk_io: field("disk_io")?,
            network_bandwidth: field("network_bandwidth")?,
        })
    }

    /// Decode a reading from a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| PredictorError::Validation(format!("invalid JSON: {}", e)))?;
        Self::from_json_value(&value)
    }

    /// Combined CPU and memory pressure in `[0, 1]` for in-domain readings.
    pub fn load_factor(&self) -> f64 {
        (self.cpu_load + self.memory_usage) / 200.0
    }
}

impl fmt::Display for MetricReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cpu={:.1}% mem={:.1}% disk={:.1}MB/s net={:.1}Mbps",
            self.cpu_load, self.memory_usage, self.disk_io, self.network_bandwidth
        )
    }
}

/// Which engine path produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Model,
    Heuristic,
}

impl PredictionSource {
    /// Fixed confidence for this source.
    pub fn confidence(&self) -> f64 {
        match self {
            PredictionSource::Model => MODEL_CONFIDENCE,
            PredictionSource::Heuristic => HEURISTIC_CONFIDENCE,
        }
    }

    /// Infer the source from a reported confidence (remote services only report the score).
    pub fn from_confidence(confidence: f64) -> Self {
        if (confidence - MODEL_CONFIDENCE).abs() < 1e-9 {
            PredictionSource::Model
        } else {
            PredictionSource::Heuristic
        }
    }
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionSource::Model => f.write_str("model"),
            PredictionSource::Heuristic => f.write_str("heuristic"),
        }
    }
}

/// Downtime estimate produced by one prediction call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted downtime in milliseconds. Not clamped.
    pub predicted_downtime: f64,
    /// Static, mode-determined confidence score.
    pub confidence: f64,
    pub source: PredictionSource,
}

impl PredictionResult {
    pub fn new(predicted_downtime: f64, source: PredictionSource) -> Self {
        Self {
            predicted_downtime,
            confidence: source.confidence(),
            source,
        }
    }
}

/// One completed simulated migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub timestamp: DateTime<Utc>,
    pub metrics: MetricReading,
    /// Predicted downtime in milliseconds.
    pub predicted_downtime: f64,
    /// Measured downtime in milliseconds.
    pub actual_downtime: f64,
    /// Prediction accuracy in `[0, 100]`.
    pub accuracy_pct: f64,
    pub confidence: f64,
}

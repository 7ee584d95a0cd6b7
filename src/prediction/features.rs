//! Feature vector construction.

use crate::error::{PredictorError, Result};
use crate::types::MetricReading;
use serde::Serialize;

/// Number of features consumed by the prediction engine.
pub const FEATURE_COUNT: usize = 4;

/// Feature names in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["cpu_load", "memory_usage", "disk_io", "network_bandwidth"];

/// Fixed-order, finite feature vector: `[cpu_load, memory_usage, disk_io, network_bandwidth]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector from a reading. Values are not clipped; only non-finite values are rejected.
    pub fn build(reading: &MetricReading) -> Result<Self> {
        let values = [
            reading.cpu_load,
            reading.memory_usage,
            reading.disk_io,
            reading.network_bandwidth,
        ];

        for (name, value) in FEATURE_NAMES.iter().zip(values.iter()) {
            if !value.is_finite() {
                return Err(PredictorError::Validation(format!(
                    "field `{}` must be finite, got {}",
                    name, value
                )));
            }
        }

        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn cpu_load(&self) -> f64 {
        self.0[0]
    }

    pub fn memory_usage(&self) -> f64 {
        self.0[1]
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<&MetricReading> for FeatureVector {
    type Error = PredictorError;

    fn try_from(reading: &MetricReading) -> Result<Self> {
        Self::build(reading)
    }
}

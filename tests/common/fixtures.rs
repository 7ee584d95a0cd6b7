// Test fixtures and stub backends for integration tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vmpredict::health::HealthReport;
use vmpredict::prediction::PredictionBackend;
use vmpredict::{MetricReading, PredictionResult, PredictorError, Result};

/// Moderately loaded host with a busy network: heuristic prediction 243.7 ms.
pub fn scenario_a() -> MetricReading {
    MetricReading::new(75.5, 68.2, 45.8, 850.0)
}

/// Heavily loaded host: load factor 0.9.
pub fn scenario_b() -> MetricReading {
    MetricReading::new(95.0, 85.0, 90.0, 200.0)
}

/// Linear artifact: 50 + 0.8 cpu + 0.6 mem + 0.4 disk - 0.1 net.
pub const LINEAR_MODEL: &str = r#"{
    "kind": "linear",
    "intercept": 50.0,
    "coefficients": [0.8, 0.6, 0.4, -0.1]
}"#;

/// Two-tree forest splitting on cpu then memory.
pub const FOREST_MODEL: &str = r#"{
    "kind": "forest",
    "trees": [
        { "nodes": [
            { "split": { "feature": 0, "threshold": 50.0, "left": 1, "right": 2 } },
            { "leaf": 120.0 },
            { "leaf": 240.0 }
        ] },
        { "nodes": [
            { "split": { "feature": 1, "threshold": 60.0, "left": 1, "right": 2 } },
            { "leaf": 100.0 },
            { "leaf": 300.0 }
        ] }
    ]
}"#;

/// Delegates to an inner backend but fails the listed prediction calls (0-based).
pub struct ScriptedBackend {
    inner: Arc<dyn PredictionBackend>,
    fail_on: HashSet<usize>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(inner: Arc<dyn PredictionBackend>, fail_on: &[usize]) -> Self {
        Self {
            inner,
            fail_on: fail_on.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionBackend for ScriptedBackend {
    async fn predict(&self, reading: &MetricReading) -> Result<PredictionResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&call) {
            return Err(PredictorError::Inference(format!("scripted failure on call {}", call)));
        }
        self.inner.predict(reading).await
    }

    async fn health(&self) -> Result<HealthReport> {
        self.inner.health().await
    }
}

/// A backend whose health check never succeeds.
#[derive(Default)]
pub struct UnreachableBackend {
    pub hang: bool,
    predictions: AtomicUsize,
}

impl UnreachableBackend {
    /// Health check hangs instead of failing fast.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn predictions(&self) -> usize {
        self.predictions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionBackend for UnreachableBackend {
    async fn predict(&self, _reading: &MetricReading) -> Result<PredictionResult> {
        self.predictions.fetch_add(1, Ordering::SeqCst);
        Err(PredictorError::Connectivity("connection refused".into()))
    }

    async fn health(&self) -> Result<HealthReport> {
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Err(PredictorError::Connectivity("connection refused".into()))
    }
}

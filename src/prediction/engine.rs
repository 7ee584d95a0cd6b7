//! Prediction engine: model-backed with a heuristic fallback.

use super::artifact::{load_artifact, ModelArtifact};
use super::features::FeatureVector;
use crate::error::Result;
use crate::observability::{self, MetricsSink};
use crate::types::{MetricReading, PredictionResult, PredictionSource};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Fixed part of the heuristic estimate, in milliseconds.
const HEURISTIC_BASE_DOWNTIME: f64 = 100.0;

/// Milliseconds added per point of the averaged CPU/memory complexity score.
const HEURISTIC_COMPLEXITY_WEIGHT: f64 = 2.0;

/// Which prediction path the engine runs. Chosen once when the engine is built.
#[derive(Clone)]
pub enum EngineMode {
    Model(Arc<dyn ModelArtifact>),
    Heuristic,
}

impl EngineMode {
    pub fn source(&self) -> PredictionSource {
        match self {
            EngineMode::Model(_) => PredictionSource::Model,
            EngineMode::Heuristic => PredictionSource::Heuristic,
        }
    }
}

/// Downtime prediction engine.
///
/// Cheap to share behind an `Arc`; the model handle is never mutated after construction.
pub struct PredictionEngine {
    mode: EngineMode,
    sink: Arc<dyn MetricsSink>,
}

impl PredictionEngine {
    /// Engine backed by an already-loaded artifact.
    pub fn with_model(artifact: Arc<dyn ModelArtifact>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            mode: EngineMode::Model(artifact),
            sink,
        }
    }

    /// Engine that always uses the heuristic.
    pub fn heuristic(sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            mode: EngineMode::Heuristic,
            sink,
        }
    }

    /// Load the artifact at `path` and pick the engine mode.
    ///
    /// A missing or corrupt artifact is not an error: it is logged and the engine runs in
    /// heuristic mode for its whole lifetime.
    pub fn load(path: &Path, sink: Arc<dyn MetricsSink>) -> Self {
        match load_artifact(path) {
            Ok(artifact) => {
                info!(path = %path.display(), model = %artifact.describe(), "Model loaded");
                Self::with_model(artifact, sink)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Model unavailable, using heuristic predictions");
                Self::heuristic(sink)
            }
        }
    }

    pub fn mode(&self) -> &EngineMode {
        &self.mode
    }

    pub fn source(&self) -> PredictionSource {
        self.mode.source()
    }

    pub fn model_loaded(&self) -> bool {
        matches!(self.mode, EngineMode::Model(_))
    }

    /// Predict downtime for a feature vector.
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let predicted_downtime = match &self.mode {
            EngineMode::Model(artifact) => artifact.predict(features).map_err(|e| {
                error!(error = %e, "Model inference failed");
                e
            })?,
            EngineMode::Heuristic => heuristic_downtime(features),
        };

        let result = PredictionResult::new(predicted_downtime, self.mode.source());
        observability::record_prediction(self.sink.as_ref(), result.confidence);

        debug!(
            predicted_downtime = result.predicted_downtime,
            confidence = result.confidence,
            source = %result.source,
            "Prediction made"
        );
        Ok(result)
    }

    /// Validate a raw reading and predict.
    pub fn predict_reading(&self, reading: &MetricReading) -> Result<PredictionResult> {
        let features = FeatureVector::build(reading)?;
        self.predict(&features)
    }
}

/// `100 + ((cpu_load + memory_usage) / 2) * 2`. Disk and network do not contribute.
pub fn heuristic_downtime(features: &FeatureVector) -> f64 {
    let complexity_score = (features.cpu_load() + features.memory_usage()) / 2.0;
    HEURISTIC_BASE_DOWNTIME + complexity_score * HEURISTIC_COMPLEXITY_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictorError;
    use crate::observability::{InMemorySink, PREDICTIONS_TOTAL, PREDICTION_CONFIDENCE};
    use crate::prediction::artifact::LinearModel;

    struct FailingModel;

    impl ModelArtifact for FailingModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64> {
            Err(PredictorError::Inference("internal error".into()))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn linear() -> Arc<dyn ModelArtifact> {
        Arc::new(LinearModel {
            intercept: 10.0,
            coefficients: vec![1.0, 1.0, 1.0, 1.0],
        })
    }

    #[test]
    fn test_heuristic_scenario() {
        let sink = Arc::new(InMemorySink::new());
        let engine = PredictionEngine::heuristic(sink.clone());

        let result = engine
            .predict_reading(&MetricReading::new(75.5, 68.2, 45.8, 850.0))
            .unwrap();

        assert!((result.predicted_downtime - 243.7).abs() < 1e-9);
        assert_eq!(result.confidence, 0.75);
        assert_eq!(result.source, PredictionSource::Heuristic);
        assert_eq!(sink.counter(PREDICTIONS_TOTAL), 1);
        assert_eq!(sink.gauge(PREDICTION_CONFIDENCE), Some(0.75));
    }

    #[test]
    fn test_heuristic_ignores_disk_and_network() {
        let engine = PredictionEngine::heuristic(Arc::new(InMemorySink::new()));
        let a = engine.predict_reading(&MetricReading::new(40.0, 60.0, 1.0, 1.0)).unwrap();
        let b = engine.predict_reading(&MetricReading::new(40.0, 60.0, 900.0, 10.0)).unwrap();
        assert_eq!(a.predicted_downtime, b.predicted_downtime);
        assert_eq!(a.predicted_downtime, 100.0 + 50.0 * 2.0);
    }

    #[test]
    fn test_heuristic_is_not_clamped() {
        let engine = PredictionEngine::heuristic(Arc::new(InMemorySink::new()));
        let result = engine
            .predict_reading(&MetricReading::new(-200.0, -100.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(result.predicted_downtime, -200.0);
    }

    #[test]
    fn test_model_mode() {
        let sink = Arc::new(InMemorySink::new());
        let engine = PredictionEngine::with_model(linear(), sink.clone());

        let result = engine
            .predict_reading(&MetricReading::new(10.0, 20.0, 30.0, 40.0))
            .unwrap();

        assert!(engine.model_loaded());
        assert_eq!(result.predicted_downtime, 110.0);
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.source, PredictionSource::Model);
        assert_eq!(sink.gauge(PREDICTION_CONFIDENCE), Some(0.85));
    }

    #[test]
    fn test_inference_failure_does_not_count() {
        let sink = Arc::new(InMemorySink::new());
        let engine = PredictionEngine::with_model(Arc::new(FailingModel), sink.clone());

        let err = engine
            .predict_reading(&MetricReading::new(10.0, 20.0, 30.0, 40.0))
            .unwrap_err();

        assert!(err.is_inference());
        assert_eq!(sink.counter(PREDICTIONS_TOTAL), 0);
        assert_eq!(sink.gauge(PREDICTION_CONFIDENCE), None);
    }

    #[test]
    fn test_validation_failure_does_not_count() {
        let sink = Arc::new(InMemorySink::new());
        let engine = PredictionEngine::heuristic(sink.clone());

        let err = engine
            .predict_reading(&MetricReading::new(f64::INFINITY, 20.0, 30.0, 40.0))
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(sink.counter(PREDICTIONS_TOTAL), 0);
    }

    #[test]
    fn test_load_missing_model_falls_back() {
        let engine = PredictionEngine::load(
            Path::new("/nonexistent/model.json"),
            Arc::new(InMemorySink::new()),
        );
        assert!(!engine.model_loaded());
        assert_eq!(engine.source(), PredictionSource::Heuristic);
    }

    #[test]
    fn test_load_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{ "kind": "linear", "intercept": 5.0, "coefficients": [1, 0, 0, 0] }"#,
        )
        .unwrap();

        let engine = PredictionEngine::load(&path, Arc::new(InMemorySink::new()));
        assert!(engine.model_loaded());

        let result = engine.predict_reading(&MetricReading::new(7.0, 0.0, 0.0, 0.0)).unwrap();
        assert_eq!(result.predicted_downtime, 12.0);
    }

    #[test]
    fn test_confidence_depends_only_on_mode() {
        let heuristic = PredictionEngine::heuristic(Arc::new(InMemorySink::new()));
        let model = PredictionEngine::with_model(linear(), Arc::new(InMemorySink::new()));

        for reading in [
            MetricReading::new(0.0, 0.0, 0.0, 0.0),
            MetricReading::new(99.0, 99.0, 500.0, 10.0),
            MetricReading::new(-5.0, 300.0, -1.0, 1e6),
        ] {
            assert_eq!(heuristic.predict_reading(&reading).unwrap().confidence, 0.75);
            assert_eq!(model.predict_reading(&reading).unwrap().confidence, 0.85);
        }
    }

    #[test]
    fn test_concurrent_predictions() {
        let sink = Arc::new(InMemorySink::new());
        let engine = Arc::new(PredictionEngine::with_model(linear(), sink.clone()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = engine.clone();
                std::thread::spawn(move || {
                    for j in 0..250 {
                        let reading = MetricReading::new(i as f64, j as f64, 0.0, 0.0);
                        engine.predict_reading(&reading).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sink.counter(PREDICTIONS_TOTAL), 1000);
    }
}

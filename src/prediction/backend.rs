//! Prediction backends: how the simulator reaches a prediction engine.

use super::engine::PredictionEngine;
use crate::config::BackendConfig;
use crate::error::{PredictorError, Result};
use crate::health::HealthReport;
use crate::types::{MetricReading, PredictionResult, PredictionSource};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of downtime predictions, local or remote.
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    /// Predict downtime for a reading.
    async fn predict(&self, reading: &MetricReading) -> Result<PredictionResult>;

    /// Check that the backend can serve predictions.
    async fn health(&self) -> Result<HealthReport>;
}

/// In-process backend wrapping a [`PredictionEngine`].
#[derive(Clone)]
pub struct LocalBackend {
    engine: Arc<PredictionEngine>,
    model_path: PathBuf,
}

impl LocalBackend {
    pub fn new(engine: Arc<PredictionEngine>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            model_path: model_path.into(),
        }
    }

    pub fn engine(&self) -> &Arc<PredictionEngine> {
        &self.engine
    }
}

#[async_trait]
impl PredictionBackend for LocalBackend {
    async fn predict(&self, reading: &MetricReading) -> Result<PredictionResult> {
        self.engine.predict_reading(reading)
    }

    async fn health(&self) -> Result<HealthReport> {
        Ok(HealthReport::serving(
            self.engine.model_loaded(),
            &self.model_path,
        ))
    }
}

/// Body returned by the prediction service's `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_downtime: f64,
    pub confidence: f64,
    #[serde(default)]
    pub status: Option<String>,
}

/// Client for a remote prediction service.
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    /// Create a client for the service at `base_url` (e.g. `http://localhost:8001`).
    pub fn new(base_url: impl Into<String>, config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PredictorError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PredictionBackend for HttpBackend {
    async fn predict(&self, reading: &MetricReading) -> Result<PredictionResult> {
        let url = format!("{}/predict", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(reading)
            .send()
            .await
            .map_err(|e| PredictorError::Connectivity(format!("POST {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                    PredictorError::Validation(format!("service rejected reading: {}", body))
                }
                _ => PredictorError::Inference(format!("service returned {}: {}", status, body)),
            });
        }

        let body: PredictResponse = response.json().await.map_err(|e| {
            PredictorError::Inference(format!("unreadable prediction response: {}", e))
        })?;
        debug!(url = %url, predicted_downtime = body.predicted_downtime, "Remote prediction received");

        let source = PredictionSource::from_confidence(body.confidence);
        if (body.confidence - source.confidence()).abs() > 1e-9 {
            warn!(
                reported = body.confidence,
                recorded = source.confidence(),
                "Prediction service reported a non-standard confidence"
            );
        }

        Ok(PredictionResult::new(body.predicted_downtime, source))
    }

    async fn health(&self) -> Result<HealthReport> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PredictorError::Connectivity(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictorError::Connectivity(format!(
                "health check returned {}",
                status
            )));
        }

        let report: HealthReport = response.json().await.map_err(|e| {
            PredictorError::Connectivity(format!("unreadable health response: {}", e))
        })?;

        Ok(report)
    }
}

/// Build the backend selected by configuration.
pub fn from_config(
    config: &BackendConfig,
    engine: impl FnOnce() -> Arc<PredictionEngine>,
    model_path: PathBuf,
) -> Result<Arc<dyn PredictionBackend>> {
    match &config.api_url {
        Some(url) => Ok(Arc::new(HttpBackend::new(url.clone(), config)?)),
        None => Ok(Arc::new(LocalBackend::new(engine(), model_path))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;
    use crate::observability::InMemorySink;

    fn local() -> LocalBackend {
        let engine = Arc::new(PredictionEngine::heuristic(Arc::new(InMemorySink::new())));
        LocalBackend::new(engine, "model/model.json")
    }

    #[tokio::test]
    async fn test_local_predict() {
        let backend = local();
        let result = backend
            .predict(&MetricReading::new(75.5, 68.2, 45.8, 850.0))
            .await
            .unwrap();
        assert!((result.predicted_downtime - 243.7).abs() < 1e-9);
        assert_eq!(result.source, PredictionSource::Heuristic);
    }

    #[tokio::test]
    async fn test_local_health_degraded_without_model() {
        let report = local().health().await.unwrap();
        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(!report.model_loaded);
    }

    #[test]
    fn test_http_backend_trims_url() {
        let backend = HttpBackend::new("http://localhost:8001/", &BackendConfig::default()).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8001");
    }

    #[test]
    fn test_from_config_selects_backend() {
        let sink = Arc::new(InMemorySink::new());
        let mut config = BackendConfig::default();

        let mut built = false;
        from_config(
            &config,
            || {
                built = true;
                Arc::new(PredictionEngine::heuristic(sink.clone()))
            },
            PathBuf::from("model/model.json"),
        )
        .unwrap();
        assert!(built);

        config.api_url = Some("http://127.0.0.1:8001".to_string());
        let mut built = false;
        from_config(
            &config,
            || {
                built = true;
                Arc::new(PredictionEngine::heuristic(sink.clone()))
            },
            PathBuf::from("model/model.json"),
        )
        .unwrap();
        assert!(!built);
    }
}

//! One simulated VM migration: metrics, prediction, timed downtime, accuracy.

use super::accuracy::{accuracy_pct, simulated_delay};
use super::probe::{SyntheticRanges, SystemProbe};
use crate::campaign::RunHistory;
use crate::config::SimulationConfig;
use crate::error::{PredictorError, Result, SimulationStage};
use crate::observability::{self, MetricsSink};
use crate::prediction::{FeatureVector, PredictionBackend};
use crate::types::{MetricReading, PredictionResult, SimulationRun};
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default upper bound on one prediction request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs simulated migrations against a prediction backend.
pub struct MigrationSimulator {
    backend: Arc<dyn PredictionBackend>,
    probe: Option<Arc<dyn SystemProbe>>,
    config: SimulationConfig,
    ranges: SyntheticRanges,
    request_timeout: Duration,
    sink: Arc<dyn MetricsSink>,
    rng: Mutex<StdRng>,
}

impl MigrationSimulator {
    /// Simulator without a system probe: unspecified readings are synthetic.
    pub fn new(
        backend: Arc<dyn PredictionBackend>,
        config: SimulationConfig,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            backend,
            probe: None,
            config,
            ranges: SyntheticRanges::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sink,
            rng: Mutex::new(rng),
        }
    }

    /// Sample live readings from `probe` when none is supplied.
    pub fn with_probe(mut self, probe: Arc<dyn SystemProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Bound every prediction request by `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn backend(&self) -> &Arc<dyn PredictionBackend> {
        &self.backend
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Use `supplied`, else a probe sample, else a synthetic reading.
    pub async fn resolve_metrics(&self, supplied: Option<MetricReading>) -> MetricReading {
        if let Some(reading) = supplied {
            return reading;
        }

        if let Some(probe) = &self.probe {
            match tokio::time::timeout(self.config.probe_timeout, probe.sample_current_metrics())
                .await
            {
                Ok(Ok(reading)) => {
                    debug!(%reading, "Sampled host metrics");
                    return reading;
                }
                Ok(Err(e)) => warn!(error = %e, "System probe failed, using synthetic metrics"),
                Err(_) => warn!(
                    timeout = ?self.config.probe_timeout,
                    "System probe timed out, using synthetic metrics"
                ),
            }
        }

        let reading = self.ranges.sample(&mut *self.rng.lock());
        debug!(%reading, "Synthesized metrics");
        reading
    }

    /// Run one simulated migration and append it to `history`.
    ///
    /// On failure nothing is appended and the error names the failing stage.
    pub async fn run_once(
        &self,
        metrics: Option<MetricReading>,
        history: &mut RunHistory,
    ) -> Result<SimulationRun> {
        let metrics = self.resolve_metrics(metrics).await;

        let prediction = self
            .request_prediction(&metrics)
            .await
            .map_err(|e| e.in_stage(SimulationStage::Predict))?;

        info!(
            %metrics,
            predicted_downtime = prediction.predicted_downtime,
            source = %prediction.source,
            "Starting migration simulation"
        );

        let actual_downtime = self
            .measure_downtime(&metrics)
            .await
            .map_err(|e| e.in_stage(SimulationStage::Measure))?;

        let run = SimulationRun {
            timestamp: Utc::now(),
            metrics,
            predicted_downtime: prediction.predicted_downtime,
            actual_downtime,
            accuracy_pct: accuracy_pct(prediction.predicted_downtime, actual_downtime),
            confidence: prediction.confidence,
        };

        history.push(run.clone());
        observability::record_simulation(self.sink.as_ref(), run.accuracy_pct);

        info!(
            actual_downtime = run.actual_downtime,
            accuracy_pct = run.accuracy_pct,
            confidence = run.confidence,
            "Migration completed"
        );
        Ok(run)
    }

    async fn request_prediction(&self, metrics: &MetricReading) -> Result<PredictionResult> {
        FeatureVector::build(metrics)?;

        match tokio::time::timeout(self.request_timeout, self.backend.predict(metrics)).await {
            Ok(result) => result,
            Err(_) => Err(PredictorError::Connectivity(format!(
                "prediction request timed out after {:?}",
                self.request_timeout
            ))),
        }
    }

    /// Sleep for the simulated migration delay and return the elapsed time in milliseconds.
    async fn measure_downtime(&self, metrics: &MetricReading) -> Result<f64> {
        let jitter = {
            let max_jitter = self.config.max_jitter.as_secs_f64();
            Duration::from_secs_f64(self.rng.lock().gen_range(0.0..=max_jitter))
        };
        let delay = simulated_delay(metrics, &self.config, jitter)?;

        let start = Instant::now();
        tokio::time::sleep(delay).await;
        Ok(start.elapsed().as_secs_f64() * 1000.0)
    }
}

//! Campaign controller: schedules simulator runs and aggregates their results.

use super::mode::CampaignMode;
use super::store::ResultsDocument;
use super::summary::{CampaignSummary, RunHistory};
use crate::cancel::CancelSignal;
use crate::config::CampaignConfig;
use crate::error::{PredictorError, Result};
use crate::health::HealthReport;
use crate::observability::{self, MetricsSink};
use crate::simulation::MigrationSimulator;
use crate::types::{MetricReading, SimulationRun};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Outcome of one campaign.
#[derive(Debug, Clone)]
pub struct CampaignReport {
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub runs: Vec<SimulationRun>,
    pub summary: CampaignSummary,
    /// Runs that failed and were skipped.
    pub skipped_runs: usize,
    pub cancelled: bool,
    /// Where the results document was written; `None` when there were no runs to save.
    pub results_path: Option<PathBuf>,
}

/// Mutable state of a campaign in progress.
#[derive(Default)]
struct CampaignState {
    history: RunHistory,
    skipped: usize,
    attempts: usize,
}

/// Drives simulator runs for one campaign at a time.
pub struct CampaignController {
    simulator: Arc<MigrationSimulator>,
    config: CampaignConfig,
    cancel: CancelSignal,
    sink: Arc<dyn MetricsSink>,
}

impl CampaignController {
    pub fn new(
        simulator: Arc<MigrationSimulator>,
        config: CampaignConfig,
        cancel: CancelSignal,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            simulator,
            config,
            cancel,
            sink,
        }
    }

    pub fn simulator(&self) -> &Arc<MigrationSimulator> {
        &self.simulator
    }

    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    /// Check the prediction backend once. An unhealthy report counts as unreachable.
    pub async fn health_check(&self) -> Result<HealthReport> {
        let timeout = self.simulator.request_timeout();
        let backend = self.simulator.backend();

        match tokio::time::timeout(timeout, backend.health()).await {
            Ok(Ok(report)) if !report.status.is_operational() => Err(PredictorError::Connectivity(
                format!("prediction backend reports {:?}", report.status),
            )),
            Ok(Ok(report)) => {
                info!(
                    status = ?report.status,
                    model_loaded = report.model_loaded,
                    "Prediction backend is healthy"
                );
                Ok(report)
            }
            Ok(Err(e)) => Err(match e {
                PredictorError::Connectivity(_) => e,
                other => PredictorError::Connectivity(other.to_string()),
            }),
            Err(_) => Err(PredictorError::Connectivity(format!(
                "health check timed out after {:?}",
                timeout
            ))),
        }
    }

    /// Run a campaign to completion or cancellation.
    ///
    /// Fails only if the pre-flight health check fails, in which case no run is attempted. Run
    /// failures are logged and skipped.
    pub async fn run(&self, mode: CampaignMode) -> Result<CampaignReport> {
        if let Err(e) = self.health_check().await {
            error!(mode = mode.name(), error = %e, "Prediction backend unreachable, campaign aborted");
            return Err(e);
        }

        info!(mode = %mode, "Starting campaign");
        let started_at = Utc::now();
        let mut state = CampaignState::default();

        let cancelled = match &mode {
            CampaignMode::Single => self.run_single(&mut state).await,
            CampaignMode::Continuous { duration, interval }
            | CampaignMode::Custom { duration, interval } => {
                self.run_timed(*duration, *interval, &mut state).await
            }
            CampaignMode::Stress { scenarios } => self.run_scenarios(scenarios, &mut state).await,
        };

        if cancelled {
            info!(completed = state.history.len(), "Campaign cancelled");
        }

        self.finish(&mode, started_at, cancelled, state)
    }

    async fn run_single(&self, state: &mut CampaignState) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        self.attempt(None, state).await;
        false
    }

    /// Returns `true` if cancelled.
    async fn run_timed(
        &self,
        duration: Duration,
        interval: Duration,
        state: &mut CampaignState,
    ) -> bool {
        let start = Instant::now();

        loop {
            if self.cancel.is_cancelled() {
                return true;
            }
            if start.elapsed() >= duration {
                return false;
            }

            self.attempt(None, state).await;

            if !self.cancel.sleep(interval).await {
                return true;
            }
        }
    }

    /// Returns `true` if cancelled.
    async fn run_scenarios(&self, scenarios: &[MetricReading], state: &mut CampaignState) -> bool {
        for (i, scenario) in scenarios.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return true;
            }
            if i > 0 && !self.cancel.sleep(self.config.stress_pause).await {
                return true;
            }

            info!(scenario = i + 1, total = scenarios.len(), "Stress scenario");
            self.attempt(Some(*scenario), state).await;
        }
        false
    }

    async fn attempt(&self, metrics: Option<MetricReading>, state: &mut CampaignState) {
        state.attempts += 1;

        match self.simulator.run_once(metrics, &mut state.history).await {
            Ok(run) => {
                let summary = state.history.summary();
                info!(
                    attempt = state.attempts,
                    accuracy_pct = run.accuracy_pct,
                    running_mean_accuracy = summary.mean_accuracy,
                    runs = summary.run_count,
                    "Run recorded"
                );
            }
            Err(e) => {
                state.skipped += 1;
                observability::record_simulation_failure(self.sink.as_ref());
                warn!(
                    attempt = state.attempts,
                    stage = ?e.stage(),
                    connectivity = e.is_connectivity(),
                    error = %e,
                    "Run failed, skipping"
                );
            }
        }
    }

    fn finish(
        &self,
        mode: &CampaignMode,
        started_at: DateTime<Utc>,
        cancelled: bool,
        mut state: CampaignState,
    ) -> Result<CampaignReport> {
        let completed_at = Utc::now();
        let summary = state.history.summary();
        let runs = state.history.take();

        let results_path = if runs.is_empty() {
            warn!(skipped = state.skipped, "No successful runs, nothing to save");
            None
        } else {
            let document = ResultsDocument {
                mode: mode.name().to_string(),
                started_at,
                completed_at,
                cancelled,
                skipped_runs: state.skipped,
                runs: runs.clone(),
                summary: summary.clone(),
            };
            Some(document.write_to(&self.config.results_dir)?)
        };

        info!(
            runs = summary.run_count,
            skipped = state.skipped,
            mean_accuracy = summary.mean_accuracy,
            min_accuracy = summary.min_accuracy,
            max_accuracy = summary.max_accuracy,
            mean_predicted_downtime = summary.mean_predicted_downtime,
            mean_actual_downtime = summary.mean_actual_downtime,
            "Campaign finished"
        );

        Ok(CampaignReport {
            mode: mode.name().to_string(),
            started_at,
            completed_at,
            runs,
            summary,
            skipped_runs: state.skipped,
            cancelled,
            results_path,
        })
    }
}

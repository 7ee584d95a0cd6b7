//! Common test utilities for integration tests.

pub mod fixtures;
pub mod mock_service;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use vmpredict::campaign::CampaignController;
use vmpredict::cancel::CancelSignal;
use vmpredict::config::{CampaignConfig, PredictorConfig, SimulationConfig};
use vmpredict::observability::InMemorySink;
use vmpredict::prediction::{LocalBackend, PredictionBackend, PredictionEngine};
use vmpredict::simulation::MigrationSimulator;

// Re-export common types
pub use fixtures::*;
pub use mock_service::*;

/// Test environment that manages temporary directories and cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub results_dir: PathBuf,
    pub model_dir: PathBuf,
    pub sink: Arc<InMemorySink>,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let results_dir = temp_dir.path().join("results");
        let model_dir = temp_dir.path().join("model");

        std::fs::create_dir_all(&model_dir).expect("Failed to create model dir");

        Self {
            temp_dir,
            results_dir,
            model_dir,
            sink: Arc::new(InMemorySink::new()),
        }
    }

    /// Writes a model artifact and returns its path.
    pub fn write_model(&self, name: &str, json: &str) -> PathBuf {
        let path = self.model_dir.join(name);
        std::fs::write(&path, json).expect("Failed to write model");
        path
    }

    /// Campaign configuration with short waits, writing into this environment.
    pub fn campaign_config(&self) -> CampaignConfig {
        CampaignConfig {
            results_dir: self.results_dir.clone(),
            continuous_duration: Duration::from_secs(10),
            continuous_interval: Duration::from_secs(1),
            stress_pause: Duration::from_millis(200),
            ..CampaignConfig::default()
        }
    }

    /// Full configuration pointing at this environment, host sampling disabled, fixed seed.
    pub fn config(&self) -> PredictorConfig {
        let mut config = PredictorConfig::default();
        config.model.path = self.model_dir.join("model.json");
        config.simulation = simulation_config();
        config.campaign = self.campaign_config();
        config
    }

    /// Heuristic in-process backend reporting to this environment's sink.
    pub fn heuristic_backend(&self) -> Arc<dyn PredictionBackend> {
        let engine = Arc::new(PredictionEngine::heuristic(self.sink.clone()));
        Arc::new(LocalBackend::new(engine, self.model_dir.join("model.json")))
    }

    /// Controller over `backend` with a fresh cancel signal.
    pub fn controller(&self, backend: Arc<dyn PredictionBackend>) -> CampaignController {
        let simulator = MigrationSimulator::new(backend, simulation_config(), self.sink.clone());
        CampaignController::new(
            Arc::new(simulator),
            self.campaign_config(),
            CancelSignal::new(),
            self.sink.clone(),
        )
    }

    /// Results documents written so far.
    pub fn result_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(&self.results_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map(|x| x == "json").unwrap_or(false))
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulation settings for deterministic tests: no host sampling, fixed seed.
pub fn simulation_config() -> SimulationConfig {
    SimulationConfig {
        use_probe: false,
        seed: Some(42),
        ..SimulationConfig::default()
    }
}

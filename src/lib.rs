//! vmpredict - VM migration downtime prediction and simulation.
//!
//! vmpredict predicts how long a virtual machine will be unavailable while it is migrated,
//! given four host load metrics, and validates those predictions by running simulated
//! migrations whose measured downtime is compared with the prediction.
//!
//! # Features
//!
//! - **Prediction Engine**: Trained regression artifact, with a deterministic heuristic
//!   fallback when no artifact can be loaded.
//! - **Prediction Backends**: In-process engine or a remote prediction service over HTTP.
//! - **Migration Simulator**: Timed, load-dependent simulated migrations with accuracy scoring.
//! - **Campaigns**: Single, continuous, stress and custom run schedules with persisted results.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        vmpredict                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Campaign Controller: Modes | Cancellation | Results        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Migration Simulator: Probe | Timed Downtime | Accuracy     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Prediction Backend: Local Engine | HTTP Service            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Prediction Engine: Features | Model Artifact | Heuristic   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use vmpredict::campaign::CampaignMode;
//! use vmpredict::cancel::CancelSignal;
//! use vmpredict::config::PredictorConfig;
//! use vmpredict::observability::RecorderSink;
//!
//! #[tokio::main]
//! async fn main() -> vmpredict::Result<()> {
//!     let config = PredictorConfig::development();
//!     let controller =
//!         vmpredict::build_controller(&config, Arc::new(RecorderSink), CancelSignal::new())?;
//!
//!     let report = controller.run(CampaignMode::stress(&config.campaign)).await?;
//!     println!("mean accuracy: {:.2}%", report.summary.mean_accuracy);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod types;

pub mod campaign;
pub mod cancel;
pub mod cli;
pub mod health;
pub mod observability;
pub mod prediction;
pub mod simulation;

// Re-exports
pub use error::{PredictorError, Result};
pub use types::*;

use campaign::CampaignController;
use cancel::CancelSignal;
use config::PredictorConfig;
use observability::MetricsSink;
use prediction::PredictionEngine;
use simulation::{MigrationSimulator, SysinfoProbe};
use std::sync::Arc;
use tracing::info;

/// Wire a campaign controller from configuration.
///
/// The model artifact is only loaded when no remote prediction service is configured.
pub fn build_controller(
    config: &PredictorConfig,
    sink: Arc<dyn MetricsSink>,
    cancel: CancelSignal,
) -> Result<CampaignController> {
    let model_path = config.model.path.clone();

    let backend = prediction::backend_from_config(
        &config.backend,
        || Arc::new(PredictionEngine::load(&model_path, sink.clone())),
        model_path.clone(),
    )?;

    match &config.backend.api_url {
        Some(url) => info!(url = %url, "Using remote prediction service"),
        None => info!(model = %model_path.display(), "Using in-process prediction engine"),
    }

    let mut simulator =
        MigrationSimulator::new(backend, config.simulation.clone(), sink.clone())
            .with_request_timeout(config.backend.request_timeout);

    if config.simulation.use_probe {
        simulator = simulator.with_probe(Arc::new(SysinfoProbe::new(config.simulation.probe_window)));
    }

    Ok(CampaignController::new(
        Arc::new(simulator),
        config.campaign.clone(),
        cancel,
        sink,
    ))
}

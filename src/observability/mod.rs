//! Observability module for vmpredict.
//!
//! Provides logging initialization and the metrics sink the engine and simulator report into.

pub mod sink;

pub use self::sink::{FanoutSink, InMemorySink, MetricsSink, RecorderSink};

use crate::config::ObservabilityConfig;
use crate::error::{PredictorError, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Total successful predictions.
pub const PREDICTIONS_TOTAL: &str = "vm_migration_predictions_total";
/// Confidence of the last successful prediction.
pub const PREDICTION_CONFIDENCE: &str = "vm_migration_accuracy";
/// Total completed simulated migrations.
pub const SIMULATIONS_TOTAL: &str = "vm_migration_simulations_total";
/// Accuracy of the last completed simulated migration.
pub const LAST_ACCURACY_PCT: &str = "vm_migration_last_accuracy_pct";
/// Total simulated migrations that failed and were skipped.
pub const SIMULATION_FAILURES_TOTAL: &str = "vm_migration_simulation_failures_total";

/// Initialize logging.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| PredictorError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| PredictorError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    info!(level = %config.log_level, json = config.json_logs, "Logging initialized");
    Ok(())
}

/// Record a successful prediction.
pub fn record_prediction(sink: &dyn MetricsSink, confidence: f64) {
    sink.increment_counter(PREDICTIONS_TOTAL);
    sink.set_gauge(PREDICTION_CONFIDENCE, confidence);
}

/// Record a completed simulated migration.
pub fn record_simulation(sink: &dyn MetricsSink, accuracy_pct: f64) {
    sink.increment_counter(SIMULATIONS_TOTAL);
    sink.set_gauge(LAST_ACCURACY_PCT, accuracy_pct);
}

/// Record a skipped simulated migration.
pub fn record_simulation_failure(sink: &dyn MetricsSink) {
    sink.increment_counter(SIMULATION_FAILURES_TOTAL);
}

//! Downtime measurement model and accuracy scoring.

use crate::config::SimulationConfig;
use crate::error::{PredictorError, Result};
use crate::types::MetricReading;
use std::time::Duration;

/// Percentage closeness of a predicted and a measured downtime, in `[0, 100]`.
///
/// `100 - |predicted - actual| / max(predicted, actual) * 100`. Two zero downtimes are a perfect
/// match; any other pair with a non-positive maximum scores zero.
pub fn accuracy_pct(predicted: f64, actual: f64) -> f64 {
    if predicted == actual {
        return 100.0;
    }

    let denominator = predicted.max(actual);
    if denominator <= 0.0 {
        return 0.0;
    }

    let accuracy = 100.0 - (predicted - actual).abs() / denominator * 100.0;
    if accuracy.is_nan() {
        0.0
    } else {
        accuracy.clamp(0.0, 100.0)
    }
}

/// Wall-clock delay a simulated migration should take for `reading`.
///
/// `base_delay + load_factor * load_scale + jitter`, floored at zero.
pub fn simulated_delay(
    reading: &MetricReading,
    config: &SimulationConfig,
    jitter: Duration,
) -> Result<Duration> {
    let seconds = config.base_delay.as_secs_f64()
        + reading.load_factor() * config.load_scale.as_secs_f64()
        + jitter.as_secs_f64();

    Duration::try_from_secs_f64(seconds.max(0.0)).map_err(|e| {
        PredictorError::Validation(format!("simulated delay of {}s is out of range: {}", seconds, e))
    })
}

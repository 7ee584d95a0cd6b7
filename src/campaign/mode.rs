//! Campaign control modes.

use crate::config::CampaignConfig;
use crate::types::MetricReading;
use std::fmt;
use std::time::Duration;

/// How a campaign schedules its runs.
#[derive(Debug, Clone, PartialEq)]
pub enum CampaignMode {
    /// Exactly one run.
    Single,
    /// Runs until `duration` has elapsed, waiting `interval` between runs.
    Continuous { duration: Duration, interval: Duration },
    /// The given readings in order, with the configured pause between them.
    Stress { scenarios: Vec<MetricReading> },
    /// Continuous mechanics with operator-supplied parameters.
    Custom { duration: Duration, interval: Duration },
}

impl CampaignMode {
    /// Continuous campaign with the configured duration and interval.
    pub fn continuous(config: &CampaignConfig) -> Self {
        CampaignMode::Continuous {
            duration: config.continuous_duration,
            interval: config.continuous_interval,
        }
    }

    /// Stress campaign over the configured scenarios.
    pub fn stress(config: &CampaignConfig) -> Self {
        CampaignMode::Stress {
            scenarios: config.stress_scenarios.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CampaignMode::Single => "single",
            CampaignMode::Continuous { .. } => "continuous",
            CampaignMode::Stress { .. } => "stress",
            CampaignMode::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for CampaignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignMode::Continuous { duration, interval }
            | CampaignMode::Custom { duration, interval } => {
                write!(f, "{} ({:?}, every {:?})", self.name(), duration, interval)
            }
            CampaignMode::Stress { scenarios } => {
                write!(f, "stress ({} scenarios)", scenarios.len())
            }
            CampaignMode::Single => f.write_str("single"),
        }
    }
}

//! Configuration module for vmpredict.

use crate::error::{PredictorError, Result};
use crate::types::MetricReading;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Model artifact configuration.
    #[serde(default)]
    pub model: ModelConfig,
    /// Prediction backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Migration simulator configuration.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Campaign configuration.
    #[serde(default)]
    pub campaign: CampaignConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl PredictorConfig {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PredictorError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| PredictorError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.model.path.as_os_str().is_empty() {
            return Err(invalid("model.path", "Model path must not be empty"));
        }

        if let Some(url) = &self.backend.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("backend.api_url", "URL must start with http:// or https://"));
            }
        }

        if self.campaign.continuous_duration.is_zero() {
            return Err(invalid(
                "campaign.continuous_duration",
                "Continuous duration must be non-zero",
            ));
        }

        if self.campaign.stress_scenarios.is_empty() {
            return Err(invalid(
                "campaign.stress_scenarios",
                "At least one stress scenario is required",
            ));
        }

        Ok(())
    }

    /// Create a configuration suited for local runs: short waits, results in a temp directory.
    pub fn development() -> Self {
        Self {
            model: ModelConfig::default(),
            backend: BackendConfig::default(),
            simulation: SimulationConfig {
                use_probe: false,
                ..SimulationConfig::default()
            },
            campaign: CampaignConfig {
                results_dir: std::env::temp_dir().join("vmpredict"),
                continuous_duration: Duration::from_secs(60),
                continuous_interval: Duration::from_secs(5),
                stress_pause: Duration::from_millis(500),
                ..CampaignConfig::default()
            },
            observability: ObservabilityConfig {
                log_level: "debug".to_string(),
                json_logs: false,
            },
        }
    }
}

fn invalid(field: &str, reason: &str) -> PredictorError {
    PredictorError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Model artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path of the trained artifact, read once at startup.
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/model.json"),
        }
    }
}

/// Prediction backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of a remote prediction service. `None` uses the in-process engine.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Connection timeout.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Request timeout, applied to every prediction and health call.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Migration simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed part of every simulated downtime.
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    /// Downtime added at a load factor of 1.0.
    #[serde(with = "humantime_serde")]
    pub load_scale: Duration,
    /// Upper bound of the uniform jitter.
    #[serde(with = "humantime_serde")]
    pub max_jitter: Duration,
    /// Sample the host when no reading is supplied.
    pub use_probe: bool,
    /// Upper bound on one probe sample.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
    /// Window over which the probe measures CPU, disk and network rates.
    #[serde(with = "humantime_serde")]
    pub probe_window: Duration,
    /// Seed for synthetic readings and jitter. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            load_scale: Duration::from_millis(300),
            max_jitter: Duration::from_millis(100),
            use_probe: true,
            probe_timeout: Duration::from_secs(2),
            probe_window: Duration::from_millis(500),
            seed: None,
        }
    }
}

/// Campaign configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Directory the results document is written into.
    pub results_dir: PathBuf,
    /// Duration of a continuous campaign.
    #[serde(with = "humantime_serde")]
    pub continuous_duration: Duration,
    /// Wait between runs of a continuous campaign.
    #[serde(with = "humantime_serde")]
    pub continuous_interval: Duration,
    /// Pause between stress scenarios.
    #[serde(with = "humantime_serde")]
    pub stress_pause: Duration,
    /// Readings replayed by a stress campaign, in order.
    pub stress_scenarios: Vec<MetricReading>,
}

impl CampaignConfig {
    /// High-load readings replayed by the stress campaign.
    pub fn default_stress_scenarios() -> Vec<MetricReading> {
        vec![
            MetricReading::new(95.0, 85.0, 90.0, 200.0),
            MetricReading::new(80.0, 95.0, 75.0, 150.0),
            MetricReading::new(90.0, 90.0, 95.0, 100.0),
        ]
    }
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("."),
            continuous_duration: Duration::from_secs(5 * 60),
            continuous_interval: Duration::from_secs(30),
            stress_pause: Duration::from_secs(2),
            stress_scenarios: Self::default_stress_scenarios(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level.
    pub log_level: String,
    /// Enable JSON logging.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Serde helper for `Duration` as a human-readable string (`"250ms"`, `"30s"`, `"5m"`, `"1h"`).
pub mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    /// Render with the largest unit that represents the value exactly.
    pub fn format_duration(duration: Duration) -> String {
        let ms = duration.as_millis();
        if ms == 0 {
            "0ms".to_string()
        } else if ms % 3_600_000 == 0 {
            format!("{}h", ms / 3_600_000)
        } else if ms % 60_000 == 0 {
            format!("{}m", ms / 60_000)
        } else if ms % 1_000 == 0 {
            format!("{}s", ms / 1_000)
        } else {
            format!("{}ms", ms)
        }
    }

    /// Parse `<n>ms`, `<n>s`, `<n>m`, `<n>h`; a bare number is milliseconds.
    pub fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        let (digits, unit_ms) = if let Some(v) = s.strip_suffix("ms") {
            (v, 1)
        } else if let Some(v) = s.strip_suffix('s') {
            (v, 1_000)
        } else if let Some(v) = s.strip_suffix('m') {
            (v, 60_000)
        } else if let Some(v) = s.strip_suffix('h') {
            (v, 3_600_000)
        } else {
            (s, 1)
        };

        let value = digits
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("invalid duration `{}`: {}", s, e))?;
        value
            .checked_mul(unit_ms)
            .map(Duration::from_millis)
            .ok_or_else(|| format!("duration `{}` overflows", s))
    }
}

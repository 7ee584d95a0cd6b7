//! Error types for vmpredict.
//!
//! This module provides a unified error type [`PredictorError`] for prediction, simulation and
//! campaign operations, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Validation**: malformed, missing or non-finite metric input
//! - **Inference**: the loaded model artifact failed to produce a value
//! - **Connectivity**: the prediction backend or system probe is unreachable or timed out
//! - **Degraded mode**: the model artifact could not be loaded at startup (logged, never surfaced
//!   through the prediction contract)
//! - **Simulation**: one stage of a simulated migration failed
//!
//! # Example
//!
//! ```rust
//! use vmpredict::error::{PredictorError, Result};
//!
//! fn check_load(cpu_load: f64) -> Result<f64> {
//!     if !cpu_load.is_finite() {
//!         return Err(PredictorError::Validation("cpu_load must be finite".into()));
//!     }
//!     Ok(cpu_load)
//! }
//!
//! assert!(check_load(f64::NAN).is_err());
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Main error type for vmpredict operations.
#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Model unavailable, running in heuristic mode: {0}")]
    DegradedMode(String),

    #[error("Simulation failed while {stage}: {source}")]
    Simulation {
        stage: SimulationStage,
        #[source]
        source: Box<PredictorError>,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The stage of a simulated migration that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStage {
    Predict,
    Measure,
}

impl fmt::Display for SimulationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationStage::Predict => f.write_str("requesting prediction"),
            SimulationStage::Measure => f.write_str("measuring downtime"),
        }
    }
}

impl PredictorError {
    /// Wrap an error as a failure of the given simulation stage.
    pub fn in_stage(self, stage: SimulationStage) -> Self {
        PredictorError::Simulation {
            stage,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through simulation wrappers.
    pub fn root_cause(&self) -> &PredictorError {
        match self {
            PredictorError::Simulation { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Check if the error (or its root cause) is a connectivity failure.
    pub fn is_connectivity(&self) -> bool {
        matches!(self.root_cause(), PredictorError::Connectivity(_))
    }

    /// Check if the error (or its root cause) is a validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self.root_cause(), PredictorError::Validation(_))
    }

    /// Check if the error (or its root cause) is an inference failure.
    pub fn is_inference(&self) -> bool {
        matches!(self.root_cause(), PredictorError::Inference(_))
    }

    /// Simulation stage that failed, if this is a simulation error.
    pub fn stage(&self) -> Option<SimulationStage> {
        match self {
            PredictorError::Simulation { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PredictorError {
    fn from(e: serde_json::Error) -> Self {
        PredictorError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for PredictorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PredictorError::Serialization(e.to_string())
        } else {
            PredictorError::Connectivity(e.to_string())
        }
    }
}

/// Result type alias for vmpredict operations.
pub type Result<T> = std::result::Result<T, PredictorError>;

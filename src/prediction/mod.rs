//! Downtime prediction.
//!
//! ```text
//! MetricReading ──► FeatureVector ──► PredictionEngine ──► PredictionResult
//!                                       │
//!                                       ├─ Model:     artifact.predict(x), confidence 0.85
//!                                       └─ Heuristic: 100 + avg(cpu, mem) * 2, confidence 0.75
//! ```
//!
//! The engine mode is chosen once, when the engine is built: if the trained artifact cannot be
//! loaded the engine serves heuristic predictions for the rest of the process. Callers reach the
//! engine either directly or through a [`PredictionBackend`], which may also be a remote service.

mod artifact;
mod backend;
mod engine;
mod features;

pub use artifact::{
    load_artifact, ArtifactSpec, ForestModel, LinearModel, ModelArtifact, RegressionTree, TreeNode,
};
pub use backend::{
    from_config as backend_from_config, HttpBackend, LocalBackend, PredictResponse,
    PredictionBackend,
};
pub use engine::{heuristic_downtime, EngineMode, PredictionEngine};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

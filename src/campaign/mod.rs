//! Simulation campaigns.
//!
//! A campaign is an ordered sequence of simulated migrations run under one control mode
//! (single, continuous, stress or custom). The controller checks the prediction backend once
//! before starting, skips runs that fail, keeps a running summary, and writes one results
//! document when the campaign completes or is cancelled.

mod controller;
mod mode;
mod store;
mod summary;

pub use controller::{CampaignController, CampaignReport};
pub use mode::CampaignMode;
pub use store::ResultsDocument;
pub use summary::{CampaignSummary, RunHistory};

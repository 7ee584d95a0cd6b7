//! Campaign results document.

use super::summary::CampaignSummary;
use crate::error::Result;
use crate::types::SimulationRun;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a campaign produced, written once when the campaign stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub cancelled: bool,
    pub skipped_runs: usize,
    pub runs: Vec<SimulationRun>,
    pub summary: CampaignSummary,
}

impl ResultsDocument {
    /// `simulation_results_<YYYYmmdd_HHMMSS>.json`, stamped with the completion time.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.file_stem())
    }

    fn file_stem(&self) -> String {
        format!(
            "simulation_results_{}",
            self.completed_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write the document into `dir`, creating it if needed. Returns the file path.
    ///
    /// Existing files are never overwritten: a campaign finishing in the same second as an
    /// earlier one gets a `_1`, `_2`, ... suffix.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)?;

        let mut suffix = 0u32;
        loop {
            let name = match suffix {
                0 => self.file_name(),
                n => format!("{}_{}.json", self.file_stem(), n),
            };
            let path = dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(json.as_bytes())?;
                    info!(path = %path.display(), runs = self.runs.len(), "Results saved");
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

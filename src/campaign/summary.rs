//! Run history and aggregate statistics for one campaign.

use crate::types::SimulationRun;
use serde::{Deserialize, Serialize};

/// Aggregate statistics over a campaign's runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub run_count: usize,
    pub mean_accuracy: f64,
    pub min_accuracy: f64,
    pub max_accuracy: f64,
    pub mean_predicted_downtime: f64,
    pub mean_actual_downtime: f64,
}

impl CampaignSummary {
    /// Recompute from scratch over `runs`, in order.
    pub fn from_runs(runs: &[SimulationRun]) -> Self {
        let mut acc = SummaryAccumulator::default();
        for run in runs {
            acc.add(run);
        }
        acc.summary()
    }

    pub fn is_empty(&self) -> bool {
        self.run_count == 0
    }
}

/// Running sums behind a [`CampaignSummary`].
#[derive(Debug, Clone, Default)]
struct SummaryAccumulator {
    count: usize,
    accuracy_sum: f64,
    accuracy_min: f64,
    accuracy_max: f64,
    predicted_sum: f64,
    actual_sum: f64,
}

impl SummaryAccumulator {
    fn add(&mut self, run: &SimulationRun) {
        if self.count == 0 {
            self.accuracy_min = run.accuracy_pct;
            self.accuracy_max = run.accuracy_pct;
        } else {
            self.accuracy_min = self.accuracy_min.min(run.accuracy_pct);
            self.accuracy_max = self.accuracy_max.max(run.accuracy_pct);
        }

        self.count += 1;
        self.accuracy_sum += run.accuracy_pct;
        self.predicted_sum += run.predicted_downtime;
        self.actual_sum += run.actual_downtime;
    }

    fn summary(&self) -> CampaignSummary {
        if self.count == 0 {
            return CampaignSummary::default();
        }

        let n = self.count as f64;
        CampaignSummary {
            run_count: self.count,
            mean_accuracy: self.accuracy_sum / n,
            min_accuracy: self.accuracy_min,
            max_accuracy: self.accuracy_max,
            mean_predicted_downtime: self.predicted_sum / n,
            mean_actual_downtime: self.actual_sum / n,
        }
    }
}

/// Append-only, creation-ordered list of runs with an incrementally maintained summary.
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    runs: Vec<SimulationRun>,
    acc: SummaryAccumulator,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, run: SimulationRun) {
        self.acc.add(&run);
        self.runs.push(run);
    }

    pub fn runs(&self) -> &[SimulationRun] {
        &self.runs
    }

    pub fn last(&self) -> Option<&SimulationRun> {
        self.runs.last()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn summary(&self) -> CampaignSummary {
        self.acc.summary()
    }

    /// Hand over the runs, emptying the history.
    pub fn take(&mut self) -> Vec<SimulationRun> {
        self.acc = SummaryAccumulator::default();
        std::mem::take(&mut self.runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricReading;
    use chrono::Utc;

    fn run(predicted: f64, actual: f64, accuracy: f64) -> SimulationRun {
        SimulationRun {
            timestamp: Utc::now(),
            metrics: MetricReading::new(50.0, 50.0, 50.0, 500.0),
            predicted_downtime: predicted,
            actual_downtime: actual,
            accuracy_pct: accuracy,
            confidence: 0.75,
        }
    }

    #[test]
    fn test_empty_summary() {
        let history = RunHistory::new();
        assert!(history.summary().is_empty());
        assert_eq!(history.summary(), CampaignSummary::default());
    }

    #[test]
    fn test_summary_values() {
        let mut history = RunHistory::new();
        history.push(run(200.0, 250.0, 80.0));
        history.push(run(300.0, 300.0, 100.0));
        history.push(run(250.0, 500.0, 50.0));

        let summary = history.summary();
        assert_eq!(summary.run_count, 3);
        assert!((summary.mean_accuracy - 230.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.min_accuracy, 50.0);
        assert_eq!(summary.max_accuracy, 100.0);
        assert_eq!(summary.mean_predicted_downtime, 250.0);
        assert!((summary.mean_actual_downtime - 350.0).abs() < 1e-12);
    }

    #[test]
    fn test_incremental_matches_recompute() {
        let mut history = RunHistory::new();
        for i in 0..50 {
            let x = i as f64;
            history.push(run(100.0 + x * 3.1, 120.0 + x * 2.7, (x * 7.3) % 100.0));
            assert_eq!(history.summary(), CampaignSummary::from_runs(history.runs()));
        }
    }

    #[test]
    fn test_mean_is_order_independent() {
        let runs: Vec<_> = [12.5, 99.0, 47.25, 0.0, 73.1]
            .iter()
            .map(|&a| run(100.0, 100.0, a))
            .collect();
        let mut reversed = runs.clone();
        reversed.reverse();

        let forward = CampaignSummary::from_runs(&runs);
        let backward = CampaignSummary::from_runs(&reversed);
        let expected = runs.iter().map(|r| r.accuracy_pct).sum::<f64>() / runs.len() as f64;

        assert!((forward.mean_accuracy - expected).abs() < 1e-9);
        assert!((forward.mean_accuracy - backward.mean_accuracy).abs() < 1e-9);
        assert_eq!(forward.min_accuracy, backward.min_accuracy);
        assert_eq!(forward.max_accuracy, backward.max_accuracy);
    }

    #[test]
    fn test_take_resets() {
        let mut history = RunHistory::new();
        history.push(run(1.0, 1.0, 100.0));

        let runs = history.take();
        assert_eq!(runs.len(), 1);
        assert!(history.is_empty());
        assert!(history.summary().is_empty());
    }
}

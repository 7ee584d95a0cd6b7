//! Command-line interface for vmpredict.

use crate::config::humantime_serde::parse_duration;
use crate::types::MetricReading;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// vmpredict - VM migration downtime prediction and simulation.
#[derive(Parser)]
#[command(name = "vmpredict")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "VMPREDICT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VMPREDICT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Remote prediction service URL (overrides the in-process engine)
    #[arg(long, env = "VMPREDICT_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Predict downtime for one set of metrics
    Predict {
        /// CPU load (%)
        #[arg(long)]
        cpu_load: f64,

        /// Memory usage (%)
        #[arg(long)]
        memory_usage: f64,

        /// Disk I/O (MB/s)
        #[arg(long)]
        disk_io: f64,

        /// Network bandwidth (Mbps)
        #[arg(long)]
        network_bandwidth: f64,
    },

    /// Check the prediction backend
    Health,

    /// Run one simulated migration
    Single,

    /// Run simulations for the configured duration and interval
    Continuous,

    /// Run the stress scenarios
    Stress,

    /// Run simulations with a custom duration and interval
    Custom {
        /// Total campaign duration (e.g. 10m)
        #[arg(short, long, value_parser = parse_duration)]
        duration: Duration,

        /// Wait between runs (e.g. 15s)
        #[arg(short, long, value_parser = parse_duration)]
        interval: Duration,
    },
}

impl Commands {
    /// The metric reading of a `predict` command.
    pub fn reading(&self) -> Option<MetricReading> {
        match self {
            Commands::Predict {
                cpu_load,
                memory_usage,
                disk_io,
                network_bandwidth,
            } => Some(MetricReading::new(
                *cpu_load,
                *memory_usage,
                *disk_io,
                *network_bandwidth,
            )),
            _ => None,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! Metric sources for simulated migrations.

use crate::error::{PredictorError, Result};
use crate::types::MetricReading;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{CpuExt, NetworkExt, NetworksExt, ProcessExt, System, SystemExt};
use tokio::time::Instant;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Live metrics from the host running the simulation.
#[async_trait]
pub trait SystemProbe: Send + Sync {
    async fn sample_current_metrics(&self) -> Result<MetricReading>;
}

/// Host probe backed by `sysinfo`.
///
/// CPU, disk and network are rates: the probe refreshes, waits `window`, refreshes again and
/// reports what happened in between. Disk I/O is the summed read+write bytes of all processes.
pub struct SysinfoProbe {
    system: Arc<Mutex<System>>,
    window: Duration,
}

impl SysinfoProbe {
    pub fn new(window: Duration) -> Self {
        let mut system = System::new();
        system.refresh_networks_list();
        Self {
            system: Arc::new(Mutex::new(system)),
            window,
        }
    }

    fn refresh(system: &mut System) {
        system.refresh_cpu();
        system.refresh_memory();
        system.refresh_networks();
        system.refresh_processes();
    }

    /// Rates accumulated since the previous refresh, spread over `elapsed` seconds.
    fn reading(system: &System, elapsed: f64) -> Result<MetricReading> {
        let total_memory = system.total_memory();
        if total_memory == 0 {
            return Err(PredictorError::Connectivity(
                "system probe reported no memory information".into(),
            ));
        }

        let cpu_load = system.global_cpu_info().cpu_usage() as f64;
        let memory_usage = system.used_memory() as f64 / total_memory as f64 * 100.0;

        let disk_bytes: u64 = system
            .processes()
            .values()
            .map(|p| {
                let usage = p.disk_usage();
                usage.read_bytes + usage.written_bytes
            })
            .sum();

        let network_bytes: u64 = system
            .networks()
            .iter()
            .map(|(_, data)| data.received() + data.transmitted())
            .sum();

        Ok(MetricReading {
            cpu_load,
            memory_usage,
            disk_io: disk_bytes as f64 / BYTES_PER_MB / elapsed,
            network_bandwidth: network_bytes as f64 * 8.0 / BYTES_PER_MB / elapsed,
        })
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PredictorError::Internal(format!("system probe task failed: {}", e)))?
}

#[async_trait]
impl SystemProbe for SysinfoProbe {
    async fn sample_current_metrics(&self) -> Result<MetricReading> {
        // Process enumeration is slow on busy hosts; keep it off the async workers.
        let system = self.system.clone();
        blocking(move || {
            Self::refresh(&mut system.lock());
            Ok(())
        })
        .await?;

        let start = Instant::now();
        tokio::time::sleep(self.window).await;
        let elapsed = start.elapsed().as_secs_f64().max(1e-3);

        let system = self.system.clone();
        blocking(move || {
            let mut system = system.lock();
            Self::refresh(&mut system);
            Self::reading(&system, elapsed)
        })
        .await
    }
}

/// Uniform sampling ranges for synthetic readings.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticRanges {
    pub cpu_load: RangeInclusive<f64>,
    pub memory_usage: RangeInclusive<f64>,
    pub disk_io: RangeInclusive<f64>,
    pub network_bandwidth: RangeInclusive<f64>,
}

impl Default for SyntheticRanges {
    fn default() -> Self {
        Self {
            cpu_load: 20.0..=95.0,
            memory_usage: 30.0..=90.0,
            disk_io: 10.0..=100.0,
            network_bandwidth: 50.0..=1000.0,
        }
    }
}

impl SyntheticRanges {
    /// Draw one reading.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MetricReading {
        MetricReading {
            cpu_load: rng.gen_range(self.cpu_load.clone()),
            memory_usage: rng.gen_range(self.memory_usage.clone()),
            disk_io: rng.gen_range(self.disk_io.clone()),
            network_bandwidth: rng.gen_range(self.network_bandwidth.clone()),
        }
    }

    pub fn contains(&self, reading: &MetricReading) -> bool {
        self.cpu_load.contains(&reading.cpu_load)
            && self.memory_usage.contains(&reading.memory_usage)
            && self.disk_io.contains(&reading.disk_io)
            && self.network_bandwidth.contains(&reading.network_bandwidth)
    }
}

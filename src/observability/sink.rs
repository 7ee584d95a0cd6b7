//! Metrics sinks.
//!
//! The engine and simulator only need two operations from a metrics backend: bump a counter and
//! set a gauge. [`RecorderSink`] forwards both to the `metrics` facade, so whichever recorder the
//! host process installed receives them; [`InMemorySink`] keeps values locally.

use metrics::{counter, gauge};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Destination for counters and gauges. Implementations must tolerate concurrent callers.
pub trait MetricsSink: Send + Sync {
    fn increment_counter(&self, name: &str);

    fn set_gauge(&self, name: &str, value: f64);
}

/// Sink that forwards to the globally installed `metrics` recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecorderSink;

impl MetricsSink for RecorderSink {
    fn increment_counter(&self, name: &str) {
        counter!(name.to_string()).increment(1);
    }

    fn set_gauge(&self, name: &str, value: f64) {
        gauge!(name.to_string()).set(value);
    }
}

/// Sink that forwards every update to each of its inner sinks.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn MetricsSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn MetricsSink>>) -> Self {
        Self { sinks }
    }
}

impl MetricsSink for FanoutSink {
    fn increment_counter(&self, name: &str) {
        for sink in &self.sinks {
            sink.increment_counter(name);
        }
    }

    fn set_gauge(&self, name: &str, value: f64) {
        for sink in &self.sinks {
            sink.set_gauge(name, value);
        }
    }
}

/// Sink that keeps counters and gauges in process memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    counters: RwLock<HashMap<String, AtomicU64>>,
    gauges: RwLock<HashMap<String, f64>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter value; zero if never incremented.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Last value set on a gauge.
    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.gauges.read().get(name).copied()
    }
}

impl MetricsSink for InMemorySink {
    fn increment_counter(&self, name: &str) {
        if let Some(counter) = self.counters.read().get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.counters
            .write()
            .entry(name.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    fn set_gauge(&self, name: &str, value: f64) {
        self.gauges.write().insert(name.to_string(), value);
    }
}

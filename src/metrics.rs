//! Metrics sink handed to the engine at construction.
//!
//! Every method defaults to a no-op, and recording never fails the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};

use crate::types::{PathId, ProcessId, Severity, TopicType};

/// Counters and gauges fed at process send/receive points and by the
/// heuristic engine.
pub trait Metrics: Send + Sync {
  fn record_active_paths(&self, _count: usize) {}

  fn inc_events_published(&self, _process: &ProcessId, _count: usize) {}

  /// Time between a reader producing data and the engine relay accepting it.
  fn observe_relay_latency(&self, _path: &PathId, _latency: Duration) {}

  fn inc_heuristic_runs(&self, _topic: TopicType) {}

  fn inc_heuristic_failures(&self, _heuristic: &str) {}

  fn inc_alerts(&self, _severity: Severity) {}

  fn inc_process_crashes(&self, _process: &ProcessId) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {}

/// Shared metrics handle.
pub type SharedMetrics = Arc<dyn Metrics>;

pub fn noop() -> SharedMetrics {
  Arc::new(NoopMetrics)
}

/// Count of active paths, pushed to [Metrics::record_active_paths] on every
/// change. Shared by every path of one manager.
#[derive(Clone)]
pub struct ActivePaths {
  count: Arc<AtomicUsize>,
  metrics: SharedMetrics,
}

impl ActivePaths {
  pub fn new(metrics: SharedMetrics) -> Self {
    Self {
      count: Arc::new(AtomicUsize::new(0)),
      metrics,
    }
  }

  pub fn get(&self) -> usize {
    self.count.load(Ordering::Acquire)
  }

  pub fn inc(&self) {
    let now = self.count.fetch_add(1, Ordering::AcqRel) + 1;
    self.metrics.record_active_paths(now);
  }

  pub fn dec(&self) {
    let prev = self
      .count
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1))
      .unwrap_or(0);
    self.metrics.record_active_paths(prev.saturating_sub(1));
  }
}

/// Metrics exported through an OpenTelemetry [Meter] owned by the host.
pub struct OtelMetrics {
  active_paths: Gauge<u64>,
  events_published: Counter<u64>,
  relay_latency: Histogram<f64>,
  heuristic_runs: Counter<u64>,
  heuristic_failures: Counter<u64>,
  alerts: Counter<u64>,
  process_crashes: Counter<u64>,
}

impl OtelMetrics {
  pub fn new(meter: &Meter) -> Self {
    Self {
      active_paths: meter
        .u64_gauge("chainweave.paths.active")
        .with_description("Paths currently active")
        .build(),
      events_published: meter
        .u64_counter("chainweave.process.events_published")
        .with_description("Events published by processes")
        .build(),
      relay_latency: meter
        .f64_histogram("chainweave.relay.latency")
        .with_unit("s")
        .with_description("Reader-to-engine latency per path")
        .build(),
      heuristic_runs: meter
        .u64_counter("chainweave.heuristic.runs")
        .build(),
      heuristic_failures: meter
        .u64_counter("chainweave.heuristic.failures")
        .build(),
      alerts: meter.u64_counter("chainweave.alerts").build(),
      process_crashes: meter
        .u64_counter("chainweave.process.crashes")
        .build(),
    }
  }
}

impl Metrics for OtelMetrics {
  fn record_active_paths(&self, count: usize) {
    self.active_paths.record(count as u64, &[]);
  }

  fn inc_events_published(&self, process: &ProcessId, count: usize) {
    self.events_published.add(
      count as u64,
      &[
        KeyValue::new("topic", process.topic.to_string()),
        KeyValue::new("network", process.network.to_string()),
      ],
    );
  }

  fn observe_relay_latency(&self, path: &PathId, latency: Duration) {
    self.relay_latency.record(
      latency.as_secs_f64(),
      &[KeyValue::new("path", path.class.to_string())],
    );
  }

  fn inc_heuristic_runs(&self, topic: TopicType) {
    self
      .heuristic_runs
      .add(1, &[KeyValue::new("topic", topic.to_string())]);
  }

  fn inc_heuristic_failures(&self, heuristic: &str) {
    self
      .heuristic_failures
      .add(1, &[KeyValue::new("heuristic", heuristic.to_string())]);
  }

  fn inc_alerts(&self, severity: Severity) {
    self
      .alerts
      .add(1, &[KeyValue::new("severity", severity.to_string())]);
  }

  fn inc_process_crashes(&self, process: &ProcessId) {
    self
      .process_crashes
      .add(1, &[KeyValue::new("process", process.to_string())]);
  }
}

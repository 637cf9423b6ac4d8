//! Tests for `metrics`.

use std::sync::Arc;
use std::time::Duration;

use crate::metrics::{self, ActivePaths, Metrics, OtelMetrics, SharedMetrics};
use crate::types::{
  Network, PathClass, PathId, PathType, ProcessId, ProcessKind, Severity, TopicType,
};

#[test]
fn otel_metrics_record_through_a_host_meter() {
  let meter = opentelemetry::global::meter("chainweave-test");
  let metrics: SharedMetrics = Arc::new(OtelMetrics::new(&meter));
  let process = ProcessId::new(
    PathType::Live,
    ProcessKind::Reader,
    TopicType::BlockHeader,
    Network::Layer1,
  );
  let path = PathId::new(PathClass::new(PathType::Live, process, process));

  metrics.record_active_paths(2);
  metrics.inc_events_published(&process, 3);
  metrics.observe_relay_latency(&path, Duration::from_millis(4));
  metrics.inc_heuristic_runs(TopicType::BlockHeader);
  metrics.inc_heuristic_failures("broken");
  metrics.inc_alerts(Severity::High);
  metrics.inc_process_crashes(&process);
}

#[test]
fn default_methods_are_no_ops() {
  struct Counting;
  impl Metrics for Counting {}
  let m = Counting;
  m.record_active_paths(1);
  m.inc_alerts(Severity::Low);
}

#[test]
fn active_paths_never_underflows() {
  let gauge = ActivePaths::new(metrics::noop());
  gauge.inc();
  gauge.inc();
  gauge.dec();
  assert_eq!(gauge.get(), 1);
  gauge.dec();
  gauge.dec();
  assert_eq!(gauge.get(), 0);
}

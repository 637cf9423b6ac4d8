//! Tests for `Path`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;

use crate::config::PathConfig;
use crate::error::EngineError;
use crate::metrics::{self, ActivePaths, Metrics};
use crate::path::Path;
use crate::process::{EngineRelay, FnTransform, Process, ReadDefinition};
use crate::testing::{FailingReader, channel_reader, wait_for};
use crate::types::{
  BlockHeader, Event, Network, PathActivity, PathClass, PathId, PathType, ProcessId, ProcessKind,
  ProcessState, TopicType,
};

fn reader_id() -> ProcessId {
  ProcessId::new(
    PathType::Live,
    ProcessKind::Reader,
    TopicType::BlockHeader,
    Network::Layer1,
  )
}

fn log_id() -> ProcessId {
  ProcessId::new(
    PathType::Live,
    ProcessKind::Subscriber,
    TopicType::Log,
    Network::Layer1,
  )
}

fn path_id() -> PathId {
  PathId::new(PathClass::new(PathType::Live, reader_id(), log_id()))
}

fn config() -> PathConfig {
  PathConfig::new(Network::Layer1, TopicType::Log, PathType::Live)
}

fn two_hop(pid: PathId, root: Box<dyn ReadDefinition>) -> Vec<Arc<Process>> {
  let reader = Arc::new(Process::reader(
    reader_id(),
    pid,
    root,
    Duration::from_millis(1),
    metrics::noop(),
  ));
  let sub = Arc::new(Process::subscriber(
    log_id(),
    pid,
    TopicType::BlockHeader,
    Box::new(FnTransform::new(|ev: Event| Ok(vec![ev.derive(TopicType::Log, ())]))),
    4,
    metrics::noop(),
  ));
  reader
    .add_subscriber(sub.key(), sub.entry_channel(TopicType::BlockHeader).unwrap())
    .unwrap();
  vec![reader, sub]
}

fn header(n: u64) -> Event {
  Event::new(
    Network::Layer1,
    TopicType::BlockHeader,
    BlockHeader {
      number: n,
      hash: format!("0x{:x}", n),
      parent_hash: String::new(),
      timestamp: n,
    },
  )
}

#[test]
fn empty_path_is_rejected() {
  assert!(matches!(
    Path::new(path_id(), config(), vec![]),
    Err(EngineError::EmptyPath)
  ));
}

#[tokio::test]
async fn run_activates_once() {
  let pid = path_id();
  let (_tx, def) = channel_reader(1);
  let path = Path::new(pid, config(), two_hop(pid, Box::new(def))).unwrap();
  let tracker = TaskTracker::new();
  assert_eq!(path.activity(), PathActivity::Inactive);

  path.run(&tracker).unwrap();
  assert_eq!(path.activity(), PathActivity::Active);
  assert!(matches!(
    path.run(&tracker),
    Err(EngineError::PathAlreadyStarted(_))
  ));

  path.close().unwrap();
  tracker.close();
  tracker.wait().await;
  assert_eq!(path.activity(), PathActivity::Terminated);
}

#[tokio::test]
async fn failing_reader_marks_path_crashed_and_leaves_siblings_running() {
  let pid = path_id();
  let path = Path::new(
    pid,
    config(),
    two_hop(pid, Box::new(FailingReader("rpc down".into()))),
  )
  .unwrap();
  let tracker = TaskTracker::new();
  path.run(&tracker).unwrap();

  assert!(wait_for(Duration::from_secs(2), || path.activity() == PathActivity::Crashed).await);
  assert_eq!(path.root().state(), ProcessState::Terminated);
  assert!(wait_for(Duration::from_secs(2), || path.terminal().state() == ProcessState::Live).await);

  path.close().unwrap();
  tracker.close();
  tracker.wait().await;
  assert_eq!(path.activity(), PathActivity::Terminated);
}

#[tokio::test]
async fn close_skips_terminated_processes() {
  let pid = path_id();
  let (_tx, def) = channel_reader(1);
  let path = Path::new(pid, config(), two_hop(pid, Box::new(def))).unwrap();
  path.close().unwrap();
  assert!(
    path
      .processes()
      .iter()
      .all(|p| p.state() == ProcessState::Terminated)
  );
  // A second close would fail with ProcessTerminated if it touched them.
  path.close().unwrap();
}

#[tokio::test]
async fn close_tolerates_processes_closed_directly() {
  let pid = path_id();
  let (_tx, def) = channel_reader(1);
  let path = Path::new(pid, config(), two_hop(pid, Box::new(def))).unwrap();
  path.terminal().close().unwrap();
  path.close().unwrap();
  assert_eq!(path.root().state(), ProcessState::Terminated);
}

#[tokio::test]
async fn block_height_comes_from_root_reader() {
  let pid = path_id();
  let (tx, def) = channel_reader(4);
  let path = Path::new(pid, config(), two_hop(pid, Box::new(def))).unwrap();
  assert!(matches!(
    path.block_height(),
    Err(EngineError::NotHeightAware(_))
  ));

  let tracker = TaskTracker::new();
  path.run(&tracker).unwrap();
  tx.send(header(42)).await.unwrap();
  assert!(wait_for(Duration::from_secs(2), || path.block_height().ok() == Some(42)).await);

  path.close().unwrap();
  tracker.close();
  tracker.wait().await;
}

#[tokio::test]
async fn relay_attaches_to_terminal_only_once() {
  let pid = path_id();
  let (_tx, def) = channel_reader(1);
  let path = Path::new(pid, config(), two_hop(pid, Box::new(def))).unwrap();
  let (ingress, _rx) = mpsc::channel(1);
  let relay = EngineRelay::new(pid, ingress, metrics::noop());
  path.add_engine_relay(relay.clone()).unwrap();
  assert!(path.terminal().has_engine_relay());
  assert!(!path.root().has_engine_relay());
  assert!(matches!(
    path.add_engine_relay(relay),
    Err(EngineError::RelayExists(_))
  ));
}

/// Remembers the last active-paths value it was given.
#[derive(Default)]
struct LastActive(AtomicUsize);

impl Metrics for LastActive {
  fn record_active_paths(&self, count: usize) {
    self.0.store(count, Ordering::SeqCst);
  }
}

#[tokio::test]
async fn crash_lowers_active_gauge_without_waiting_for_shutdown() {
  let recorded = Arc::new(LastActive::default());
  let gauge = ActivePaths::new(recorded.clone());
  let pid = path_id();
  let (_tx, def) = channel_reader(1);
  let healthy = Path::new(pid, config(), two_hop(pid, Box::new(def)))
    .unwrap()
    .with_active_gauge(gauge.clone());
  let failing_id = path_id();
  let failing = Path::new(
    failing_id,
    config(),
    two_hop(failing_id, Box::new(FailingReader("rpc down".into()))),
  )
  .unwrap()
  .with_active_gauge(gauge.clone());

  let tracker = TaskTracker::new();
  healthy.run(&tracker).unwrap();
  assert_eq!(recorded.0.load(Ordering::SeqCst), 1);
  failing.run(&tracker).unwrap();

  assert!(wait_for(Duration::from_secs(2), || failing.activity() == PathActivity::Crashed).await);
  assert_eq!(gauge.get(), 1);
  assert_eq!(recorded.0.load(Ordering::SeqCst), 1);

  healthy.close().unwrap();
  failing.close().unwrap();
  assert_eq!(gauge.get(), 0);
  assert_eq!(recorded.0.load(Ordering::SeqCst), 0);
  tracker.close();
  tracker.wait().await;
}

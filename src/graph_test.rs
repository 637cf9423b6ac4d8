//! Tests for `graph`.

use std::sync::Arc;
use std::time::Duration;

use crate::error::EngineError;
use crate::graph::ProcessGraph;
use crate::metrics;
use crate::process::{FnTransform, Process};
use crate::testing::channel_reader;
use crate::types::{
  Network, PathClass, PathId, PathType, ProcessId, ProcessKind, TopicType,
};

fn id(kind: ProcessKind, topic: TopicType) -> ProcessId {
  ProcessId::new(PathType::Live, kind, topic, Network::Layer1)
}

fn path_id() -> PathId {
  PathId::new(PathClass::new(
    PathType::Live,
    id(ProcessKind::Reader, TopicType::BlockHeader),
    id(ProcessKind::Subscriber, TopicType::Log),
  ))
}

fn reader(pid: PathId) -> Arc<Process> {
  let (_tx, def) = channel_reader(1);
  Arc::new(Process::reader(
    id(ProcessKind::Reader, TopicType::BlockHeader),
    pid,
    Box::new(def),
    Duration::from_millis(1),
    metrics::noop(),
  ))
}

fn subscriber(pid: PathId, topic: TopicType, consumes: TopicType) -> Arc<Process> {
  Arc::new(Process::subscriber(
    id(ProcessKind::Subscriber, topic),
    pid,
    consumes,
    Box::new(FnTransform::new(|ev| Ok(vec![ev]))),
    1,
    metrics::noop(),
  ))
}

#[test]
fn duplicate_node_is_rejected() {
  let mut g = ProcessGraph::new();
  let a = reader(path_id());
  g.add(a.key(), a.clone()).unwrap();
  assert!(matches!(
    g.add(a.key(), a.clone()),
    Err(EngineError::ProcessExists(_))
  ));
  assert_eq!(g.len(), 1);
}

#[test]
fn edge_rejection_properties() {
  let pid = path_id();
  let mut g = ProcessGraph::new();
  let a = reader(pid);
  let b = subscriber(pid, TopicType::Log, TopicType::BlockHeader);
  let c = subscriber(pid, TopicType::AccountBalance, TopicType::BlockHeader);
  for p in [&a, &b, &c] {
    g.add(p.key(), (*p).clone()).unwrap();
  }

  g.subscribe(a.key(), b.key()).unwrap();
  assert!(matches!(
    g.subscribe(a.key(), b.key()),
    Err(EngineError::EdgeExists { .. })
  ));
  // The inverse edge fails: a reader has no entry channel.
  assert!(g.subscribe(b.key(), a.key()).is_err());
  g.subscribe(a.key(), c.key()).unwrap();

  assert_eq!(a.subscriber_count(), 2);
  assert_eq!(g.edges()[&a.key()].len(), 2);
}

#[test]
fn subscribe_requires_both_nodes() {
  let pid = path_id();
  let mut g = ProcessGraph::new();
  let a = reader(pid);
  let b = subscriber(pid, TopicType::Log, TopicType::BlockHeader);
  g.add(a.key(), a.clone()).unwrap();
  assert!(matches!(
    g.subscribe(a.key(), b.key()),
    Err(EngineError::ProcessNotFound(_))
  ));
}

#[test]
fn subscribe_checks_topic_types() {
  let pid = path_id();
  let mut g = ProcessGraph::new();
  let a = reader(pid);
  let wrong = subscriber(pid, TopicType::AccountBalance, TopicType::Log);
  g.add(a.key(), a.clone()).unwrap();
  g.add(wrong.key(), wrong.clone()).unwrap();
  assert!(matches!(
    g.subscribe(a.key(), wrong.key()),
    Err(EngineError::TopicMismatch { .. })
  ));
  assert!(g.edges().is_empty());
}

#[test]
fn add_many_wires_consecutive_pairs() {
  let pid = path_id();
  let mut g = ProcessGraph::new();
  let a = reader(pid);
  let b = subscriber(pid, TopicType::Log, TopicType::BlockHeader);
  let c = subscriber(pid, TopicType::AccountBalance, TopicType::Log);
  g.add_many(&[a.clone(), b.clone(), c.clone()]).unwrap();
  assert_eq!(g.len(), 3);
  assert!(g.edges()[&a.key()].contains(&b.key()));
  assert!(g.edges()[&b.key()].contains(&c.key()));
  assert!(!g.edges().contains_key(&c.key()));
}

#[test]
fn add_many_failure_leaves_graph_untouched() {
  let pid = path_id();
  let mut g = ProcessGraph::new();
  let a = reader(pid);
  let wrong = subscriber(pid, TopicType::Log, TopicType::AccountBalance);
  assert!(g.add_many(&[a.clone(), wrong]).is_err());
  assert!(g.is_empty());
  assert!(matches!(g.add_many(&[]), Err(EngineError::EmptyPath)));
}

#[test]
fn remove_edge_unregisters_subscriber() {
  let pid = path_id();
  let mut g = ProcessGraph::new();
  let a = reader(pid);
  let b = subscriber(pid, TopicType::Log, TopicType::BlockHeader);
  g.add_many(&[a.clone(), b.clone()]).unwrap();
  g.remove_edge(a.key(), b.key()).unwrap();
  assert_eq!(a.subscriber_count(), 0);
  assert!(g.remove_edge(a.key(), b.key()).is_err());
  g.subscribe(a.key(), b.key()).unwrap();
}

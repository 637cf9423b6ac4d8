//! Content-derived process identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Network, PathType, ProcessKind, TopicType};

/// Identifies the logical process that reads or derives one topic on one
/// network under one path type.
///
/// Two processes built from the same inputs compare equal, which lets the engine
/// recognise the same logical process across distinct path instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId {
  pub path_type: PathType,
  pub kind: ProcessKind,
  pub topic: TopicType,
  pub network: Network,
}

impl ProcessId {
  pub fn new(path_type: PathType, kind: ProcessKind, topic: TopicType, network: Network) -> Self {
    Self {
      path_type,
      kind,
      topic,
      network,
    }
  }
}

impl fmt::Display for ProcessId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}:{}:{}",
      self.path_type, self.kind, self.topic, self.network
    )
  }
}

/// A concrete process instance: its logical id scoped by the instance of the
/// path that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessKey {
  pub id: ProcessId,
  pub instance: Uuid,
}

impl ProcessKey {
  pub fn new(id: ProcessId, instance: Uuid) -> Self {
    Self { id, instance }
  }
}

impl fmt::Display for ProcessKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}::{}", self.id, self.instance)
  }
}

//! Path identifiers: a shape class plus an instance discriminator.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Network, PathType, ProcessId};

/// Shape of a pipeline: which topic chain, on which network, under which path
/// type. Every instance built from the same request shares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathClass {
  pub path_type: PathType,
  pub first: ProcessId,
  pub last: ProcessId,
}

impl PathClass {
  pub fn new(path_type: PathType, first: ProcessId, last: ProcessId) -> Self {
    Self {
      path_type,
      first,
      last,
    }
  }

  pub fn network(&self) -> Network {
    self.first.network
  }
}

impl fmt::Display for PathClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}:{}->{}",
      self.path_type,
      self.network(),
      self.first.topic,
      self.last.topic
    )
  }
}

/// Full identifier of one path instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathId {
  pub class: PathClass,
  pub instance: Uuid,
}

impl PathId {
  /// New instance of `class` with a fresh discriminator.
  pub fn new(class: PathClass) -> Self {
    Self {
      class,
      instance: Uuid::new_v4(),
    }
  }

  pub fn network(&self) -> Network {
    self.class.network()
  }

  pub fn path_type(&self) -> PathType {
    self.class.path_type
  }
}

impl fmt::Display for PathId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}::{}", self.class, self.instance)
  }
}

//! Whether a process originates data or derives it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a process originates data (reader) or derives it from one upstream
/// topic (subscriber).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
  Reader,
  Subscriber,
}

impl fmt::Display for ProcessKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProcessKind::Reader => write!(f, "reader"),
      ProcessKind::Subscriber => write!(f, "subscriber"),
    }
  }
}

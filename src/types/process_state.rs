//! Lifecycle state of a process.

use std::fmt;

/// Lifecycle state of a process. `Terminated` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProcessState {
  Inactive = 0,
  Live = 1,
  Terminated = 2,
}

impl ProcessState {
  pub(crate) fn from_u8(v: u8) -> Self {
    match v {
      0 => ProcessState::Inactive,
      1 => ProcessState::Live,
      _ => ProcessState::Terminated,
    }
  }
}

impl fmt::Display for ProcessState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProcessState::Inactive => write!(f, "inactive"),
      ProcessState::Live => write!(f, "live"),
      ProcessState::Terminated => write!(f, "terminated"),
    }
  }
}

//! Activity state of a path.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Activity state of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PathActivity {
  Inactive = 0,
  Active = 1,
  Crashed = 2,
  Terminated = 3,
}

impl PathActivity {
  fn from_u8(v: u8) -> Self {
    match v {
      0 => PathActivity::Inactive,
      1 => PathActivity::Active,
      2 => PathActivity::Crashed,
      _ => PathActivity::Terminated,
    }
  }
}

impl fmt::Display for PathActivity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PathActivity::Inactive => write!(f, "inactive"),
      PathActivity::Active => write!(f, "active"),
      PathActivity::Crashed => write!(f, "crashed"),
      PathActivity::Terminated => write!(f, "terminated"),
    }
  }
}

/// Shared, lock-free cell holding a [PathActivity]. Cloned into process tasks so
/// a failing task can mark its path crashed.
#[derive(Debug, Clone)]
pub struct ActivityCell(Arc<AtomicU8>);

impl ActivityCell {
  pub fn new(activity: PathActivity) -> Self {
    Self(Arc::new(AtomicU8::new(activity as u8)))
  }

  pub fn get(&self) -> PathActivity {
    PathActivity::from_u8(self.0.load(Ordering::Acquire))
  }

  pub fn set(&self, activity: PathActivity) {
    self.0.store(activity as u8, Ordering::Release);
  }

  /// Stores `activity` and returns the previous state.
  pub fn swap(&self, activity: PathActivity) -> PathActivity {
    PathActivity::from_u8(self.0.swap(activity as u8, Ordering::AcqRel))
  }

  /// Moves `from` to `to`. Returns false if the state was not `from`.
  pub fn transition(&self, from: PathActivity, to: PathActivity) -> bool {
    self
      .0
      .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }
}

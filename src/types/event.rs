//! Unit of data flowing between processes.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{Network, TopicType};
use crate::error::EngineError;

/// Unit of data flowing between processes. The payload is type-erased like
/// every item in the topology; consumers recover it with [Event::value].
#[derive(Clone)]
pub struct Event {
  pub network: Network,
  pub topic: TopicType,
  /// Time the originating reader produced the data. Derived events keep it.
  pub timestamp: DateTime<Utc>,
  pub value: Arc<dyn Any + Send + Sync>,
}

impl Event {
  /// New event stamped with the current time.
  pub fn new<T: Any + Send + Sync>(network: Network, topic: TopicType, value: T) -> Self {
    Self {
      network,
      topic,
      timestamp: Utc::now(),
      value: Arc::new(value),
    }
  }

  /// Event of another topic derived from this one; network and timestamp carry over.
  pub fn derive<T: Any + Send + Sync>(&self, topic: TopicType, value: T) -> Self {
    Self {
      network: self.network,
      topic,
      timestamp: self.timestamp,
      value: Arc::new(value),
    }
  }

  /// Borrows the payload as `T`.
  pub fn value<T: Any>(&self) -> Result<&T, EngineError> {
    self
      .value
      .downcast_ref::<T>()
      .ok_or(EngineError::Cast {
        topic: self.topic,
        expected: type_name::<T>(),
      })
  }

  /// True when both events carry the same payload allocation.
  pub fn same_payload(&self, other: &Event) -> bool {
    Arc::ptr_eq(&self.value, &other.value)
  }
}

impl fmt::Debug for Event {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Event")
      .field("network", &self.network)
      .field("topic", &self.topic)
      .field("timestamp", &self.timestamp)
      .finish_non_exhaustive()
  }
}

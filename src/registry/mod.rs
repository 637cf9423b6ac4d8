//! Topic registry: the declarative map from topic to process constructor.
//!
//! A [TopicPath] is resolved by following dependencies from the requested
//! topic back to a reader, so every path starts at a data source.

mod defaults;
mod topic_path;
mod topic_registry;

use std::sync::Arc;

use crate::client::ChainClients;
use crate::config::{ClientConfig, EngineConfig};
use crate::error::Result;
use crate::process::{ReadDefinition, TransformDefinition};
use crate::state::StateStore;
use crate::types::{Network, PathId, ProcessId, ProcessKind, StateKey, TopicType};

pub use defaults::default_registry;
pub use topic_path::TopicPath;
pub use topic_registry::TopicRegistry;

/// Everything a constructor may draw on when instantiating a process.
pub struct BuildContext<'a> {
  pub process_id: ProcessId,
  pub path_id: PathId,
  pub network: Network,
  pub clients: &'a ChainClients,
  pub state: Arc<dyn StateStore>,
  /// Topic state key bound to the path being built.
  pub state_key: Option<StateKey>,
  pub client_config: &'a ClientConfig,
  pub engine_config: &'a EngineConfig,
}

pub type ReaderCtor =
  Arc<dyn Fn(&BuildContext<'_>) -> Result<Box<dyn ReadDefinition>> + Send + Sync>;

pub type SubscriberCtor =
  Arc<dyn Fn(&BuildContext<'_>) -> Result<Box<dyn TransformDefinition>> + Send + Sync>;

/// Constructor of a topic's process logic, tagged by process kind.
#[derive(Clone)]
pub enum Constructor {
  Reader(ReaderCtor),
  Subscriber(SubscriberCtor),
}

impl Constructor {
  pub fn reader<F>(f: F) -> Self
  where
    F: Fn(&BuildContext<'_>) -> Result<Box<dyn ReadDefinition>> + Send + Sync + 'static,
  {
    Constructor::Reader(Arc::new(f))
  }

  pub fn subscriber<F>(f: F) -> Self
  where
    F: Fn(&BuildContext<'_>) -> Result<Box<dyn TransformDefinition>> + Send + Sync + 'static,
  {
    Constructor::Subscriber(Arc::new(f))
  }

  pub fn kind(&self) -> ProcessKind {
    match self {
      Constructor::Reader(_) => ProcessKind::Reader,
      Constructor::Subscriber(_) => ProcessKind::Subscriber,
    }
  }
}

/// Declaration of one topic.
#[derive(Clone)]
pub struct TopicSpec {
  pub topic: TopicType,
  pub constructor: Constructor,
  /// Upstream topics. Readers have none, subscribers exactly one.
  pub dependencies: Vec<TopicType>,
  /// Template of the per-path state key, for stateful topics.
  pub state_key: Option<StateKey>,
}

impl TopicSpec {
  pub fn reader(topic: TopicType, constructor: Constructor) -> Self {
    Self {
      topic,
      constructor,
      dependencies: vec![],
      state_key: None,
    }
  }

  pub fn subscriber(topic: TopicType, upstream: TopicType, constructor: Constructor) -> Self {
    Self {
      topic,
      constructor,
      dependencies: vec![upstream],
      state_key: None,
    }
  }

  pub fn with_state_key(mut self, key: StateKey) -> Self {
    self.state_key = Some(key);
    self
  }

  pub fn kind(&self) -> ProcessKind {
    self.constructor.kind()
  }

  pub fn stateful(&self) -> bool {
    self.state_key.is_some()
  }

  /// Id of this topic's process on `network` under `path_type`.
  pub fn process_id(&self, path_type: crate::types::PathType, network: Network) -> ProcessId {
    ProcessId::new(path_type, self.kind(), self.topic, network)
  }
}

impl std::fmt::Debug for TopicSpec {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TopicSpec")
      .field("topic", &self.topic)
      .field("kind", &self.kind())
      .field("dependencies", &self.dependencies)
      .field("state_key", &self.state_key)
      .finish()
  }
}

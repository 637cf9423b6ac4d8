//! Crate-wide error taxonomy.

use crate::types::{PathId, ProcessId, ProcessKey, TopicType};

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while building, running or tearing down process paths.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  /// No topic with this type is registered.
  #[error("unknown topic type: {0}")]
  UnknownTopic(TopicType),

  /// Topic dependencies loop back on themselves.
  #[error("dependency cycle detected involving topic: {0}")]
  DependencyCycle(TopicType),

  /// A path was requested that would contain no processes.
  #[error("path would contain no processes")]
  EmptyPath,

  /// A process with this key is already a node of the graph.
  #[error("process already exists in graph: {0}")]
  ProcessExists(ProcessKey),

  /// The graph has no node with this key.
  #[error("process not found in graph: {0}")]
  ProcessNotFound(ProcessKey),

  /// The edge is already recorded in the graph.
  #[error("edge already exists: {from} -> {to}")]
  EdgeExists { from: ProcessKey, to: ProcessKey },

  /// The process already fans out to this subscriber.
  #[error("subscriber already exists: {0}")]
  SubscriberExists(ProcessKey),

  /// The process has no subscriber with this key.
  #[error("subscriber not found: {0}")]
  SubscriberNotFound(ProcessKey),

  /// At most one engine relay may be attached to a process.
  #[error("engine relay already attached to process {0}")]
  RelayExists(ProcessId),

  /// Readers originate data and accept no upstream channel.
  #[error("process {0} has no entry channel")]
  NoEntryChannel(ProcessId),

  /// The upstream output type does not match the downstream input type.
  #[error("topic mismatch: process {process} consumes {expected}, got {actual}")]
  TopicMismatch {
    process: ProcessId,
    expected: TopicType,
    actual: TopicType,
  },

  /// A topic constructor rejected its build context.
  #[error("failed to construct process for {topic}: {reason}")]
  Construction { topic: TopicType, reason: String },

  /// An event value did not hold the expected concrete type.
  #[error("cast failure on {topic} event: expected {expected}")]
  Cast {
    topic: TopicType,
    expected: &'static str,
  },

  /// The chain client failed.
  #[error("chain client error: {0}")]
  Client(String),

  /// The state store failed.
  #[error("state store error: {0}")]
  State(String),

  /// The process event loop was already started once.
  #[error("process already running: {0}")]
  AlreadyRunning(ProcessId),

  /// The process has already been terminated.
  #[error("process already terminated: {0}")]
  ProcessTerminated(ProcessId),

  /// No path with this identifier is registered.
  #[error("path not found: {0}")]
  PathNotFound(PathId),

  /// `run` was called on a path that already left `Inactive`.
  #[error("path already started: {0}")]
  PathAlreadyStarted(PathId),

  /// The path's reader does not track chain height, or has not reported one yet.
  #[error("path {0} has no height-aware reader")]
  NotHeightAware(PathId),

  /// One or more processes failed to close.
  #[error("failed to close {} process(es): {}", .0.len(), join_close_errors(.0))]
  Close(Vec<(ProcessId, EngineError)>),

  /// Invalid configuration value.
  #[error("invalid configuration: {0}")]
  Config(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// The receiving half of a channel is gone.
  #[error("channel closed: {0}")]
  ChannelClosed(String),
}

fn join_close_errors(errors: &[(ProcessId, EngineError)]) -> String {
  errors
    .iter()
    .map(|(id, e)| format!("{}: {}", id, e))
    .collect::<Vec<_>>()
    .join("; ")
}

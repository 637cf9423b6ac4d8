//! Pluggable rules evaluated against path output.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{HeuristicId, HeuristicInput, PathId, Severity, TopicType};

/// Outcome of a heuristic that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
  pub message: String,
}

impl Activation {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

/// A rule over one topic's events.
#[async_trait]
pub trait Heuristic: Send + Sync {
  fn name(&self) -> &str;

  /// Topic of the events this heuristic understands.
  fn input_topic(&self) -> TopicType;

  /// `Ok(Some(..))` when the rule is violated.
  async fn assess(&self, input: &HeuristicInput) -> Result<Option<Activation>>;
}

/// A heuristic bound to one path.
#[derive(Clone)]
pub struct Deployment {
  pub id: HeuristicId,
  pub path_id: PathId,
  pub severity: Severity,
  pub heuristic: Arc<dyn Heuristic>,
}

impl std::fmt::Debug for Deployment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Deployment")
      .field("id", &self.id)
      .field("path_id", &self.path_id)
      .field("severity", &self.severity)
      .field("heuristic", &self.heuristic.name())
      .finish()
  }
}

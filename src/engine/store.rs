//! Deployed heuristics, looked up by path and topic.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::{Deployment, Heuristic};
use crate::types::{HeuristicId, PathId, Severity, TopicType};

type Scope = (PathId, TopicType);

/// Heuristics keyed by the path they watch and the topic they consume.
#[derive(Default)]
pub struct HeuristicStore {
  deployments: RwLock<HashMap<Scope, Vec<Deployment>>>,
}

impl HeuristicStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Deploys `heuristic` on `path_id` and returns its id.
  pub fn deploy(
    &self,
    path_id: PathId,
    heuristic: Arc<dyn Heuristic>,
    severity: Severity,
  ) -> HeuristicId {
    let id = HeuristicId::new();
    let scope = (path_id, heuristic.input_topic());
    debug!(heuristic_id = %id, %path_id, name = heuristic.name(), "heuristic deployed");
    self
      .deployments
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(scope)
      .or_default()
      .push(Deployment {
        id,
        path_id,
        severity,
        heuristic,
      });
    id
  }

  /// Returns whether a deployment was removed.
  pub fn remove(&self, id: &HeuristicId) -> bool {
    let mut map = self
      .deployments
      .write()
      .unwrap_or_else(PoisonError::into_inner);
    let mut removed = false;
    map.retain(|_, deployments| {
      let before = deployments.len();
      deployments.retain(|d| d.id != *id);
      removed |= deployments.len() != before;
      !deployments.is_empty()
    });
    removed
  }

  /// Heuristics watching `topic` on `path_id`.
  pub fn lookup(&self, path_id: PathId, topic: TopicType) -> Vec<Deployment> {
    self
      .deployments
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(&(path_id, topic))
      .cloned()
      .unwrap_or_default()
  }

  pub fn len(&self) -> usize {
    self
      .deployments
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .values()
      .map(Vec::len)
      .sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

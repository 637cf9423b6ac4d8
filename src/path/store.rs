//! Registry of path instances.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::Path;
use crate::error::{EngineError, Result};
use crate::types::{PathActivity, PathClass, PathId, ProcessId};

/// Paths bucketed by class, with a reverse index from process id to the
/// paths containing it.
#[derive(Default)]
pub struct PathStore {
  paths: HashMap<PathClass, Vec<(Uuid, Arc<Path>)>>,
  by_process: HashMap<ProcessId, Vec<PathId>>,
}

impl PathStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends `path` under its class bucket and indexes its processes.
  pub fn add_path(&mut self, path: Arc<Path>) {
    let id = path.id();
    for process in path.processes() {
      self.by_process.entry(process.id()).or_default().push(id);
    }
    self
      .paths
      .entry(id.class)
      .or_default()
      .push((id.instance, path));
    debug!(path_id = %id, "path stored");
  }

  pub fn get_path_by_id(&self, id: &PathId) -> Result<Arc<Path>> {
    self
      .paths
      .get(&id.class)
      .and_then(|bucket| bucket.iter().find(|(inst, _)| *inst == id.instance))
      .map(|(_, p)| p.clone())
      .ok_or(EngineError::PathNotFound(*id))
  }

  /// Every instance sharing `class`, in insertion order.
  pub fn get_existing_paths(&self, class: &PathClass) -> Vec<Arc<Path>> {
    self
      .paths
      .get(class)
      .map(|bucket| bucket.iter().map(|(_, p)| p.clone()).collect())
      .unwrap_or_default()
  }

  /// Paths owning a process with this id.
  pub fn paths_for_process(&self, id: &ProcessId) -> &[PathId] {
    self.by_process.get(id).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn active_count(&self) -> usize {
    self
      .paths()
      .filter(|p| p.activity() == PathActivity::Active)
      .count()
  }

  pub fn paths(&self) -> impl Iterator<Item = &Arc<Path>> {
    self.paths.values().flat_map(|bucket| bucket.iter().map(|(_, p)| p))
  }

  pub fn len(&self) -> usize {
    self.paths.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Drops a path and its reverse-index entries. Never called by the engine
  /// itself; terminated paths stay until a host removes them.
  pub fn remove(&mut self, id: &PathId) -> Result<Arc<Path>> {
    let bucket = self
      .paths
      .get_mut(&id.class)
      .ok_or(EngineError::PathNotFound(*id))?;
    let pos = bucket
      .iter()
      .position(|(inst, _)| *inst == id.instance)
      .ok_or(EngineError::PathNotFound(*id))?;
    let (_, path) = bucket.remove(pos);
    if bucket.is_empty() {
      self.paths.remove(&id.class);
    }
    for process in path.processes() {
      if let Some(ids) = self.by_process.get_mut(&process.id()) {
        ids.retain(|p| p != id);
        if ids.is_empty() {
          self.by_process.remove(&process.id());
        }
      }
    }
    Ok(path)
  }
}

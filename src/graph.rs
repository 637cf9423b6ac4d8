//! Directed topology connecting processes by topic-typed channels.
//!
//! The graph rejects duplicate nodes and duplicate edges but performs no cycle
//! detection: callers must only wire processes along a [crate::registry::TopicPath],
//! which is acyclic because the registry rejects dependency cycles at load time.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{EngineError, Result};
use crate::process::Process;
use crate::types::ProcessKey;

/// Process nodes and the subscriber edges between them.
#[derive(Default)]
pub struct ProcessGraph {
  nodes: HashMap<ProcessKey, Arc<Process>>,
  edges: BTreeMap<ProcessKey, BTreeSet<ProcessKey>>,
}

impl ProcessGraph {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn contains(&self, key: &ProcessKey) -> bool {
    self.nodes.contains_key(key)
  }

  pub fn get(&self, key: &ProcessKey) -> Option<Arc<Process>> {
    self.nodes.get(key).cloned()
  }

  /// Inserts a node. Fails if the key is taken.
  #[instrument(level = "trace", skip(self, process))]
  pub fn add(&mut self, key: ProcessKey, process: Arc<Process>) -> Result<()> {
    if self.nodes.contains_key(&key) {
      return Err(EngineError::ProcessExists(key));
    }
    self.nodes.insert(key, process);
    Ok(())
  }

  /// Feeds `from`'s output into `to`'s entry channel for that topic.
  ///
  /// Precondition: the edge must not close a cycle. Fails if either node is
  /// missing, the edge exists, or `to` does not consume `from`'s topic.
  #[instrument(level = "trace", skip(self))]
  pub fn subscribe(&mut self, from: ProcessKey, to: ProcessKey) -> Result<()> {
    let from_node = self
      .nodes
      .get(&from)
      .ok_or(EngineError::ProcessNotFound(from))?;
    let to_node = self
      .nodes
      .get(&to)
      .ok_or(EngineError::ProcessNotFound(to))?;
    if self.edges.get(&from).is_some_and(|e| e.contains(&to)) {
      return Err(EngineError::EdgeExists { from, to });
    }
    let entry = to_node.entry_channel(from_node.emits())?;
    from_node.add_subscriber(to, entry)?;
    self.edges.entry(from).or_default().insert(to);
    debug!(%from, %to, "edge added");
    Ok(())
  }

  /// Removes an edge and the subscriber registration behind it.
  pub fn remove_edge(&mut self, from: ProcessKey, to: ProcessKey) -> Result<()> {
    let removed = self
      .edges
      .get_mut(&from)
      .is_some_and(|e| e.remove(&to));
    if !removed {
      return Err(EngineError::SubscriberNotFound(to));
    }
    if let Some(node) = self.nodes.get(&from) {
      node.remove_subscriber(&to)?;
    }
    Ok(())
  }

  /// Inserts an ordered chain and wires each consecutive pair.
  ///
  /// Everything is checked before the graph is touched, so a failure leaves
  /// it unchanged.
  #[instrument(level = "trace", skip(self, processes), fields(count = processes.len()))]
  pub fn add_many(&mut self, processes: &[Arc<Process>]) -> Result<()> {
    if processes.is_empty() {
      return Err(EngineError::EmptyPath);
    }
    let mut seen = BTreeSet::new();
    for p in processes {
      if self.nodes.contains_key(&p.key()) || !seen.insert(p.key()) {
        return Err(EngineError::ProcessExists(p.key()));
      }
    }
    for pair in processes.windows(2) {
      pair[1].entry_channel(pair[0].emits())?;
    }

    for p in processes {
      self.add(p.key(), p.clone())?;
    }
    for pair in processes.windows(2) {
      self.subscribe(pair[0].key(), pair[1].key())?;
    }
    Ok(())
  }

  /// Read-only adjacency view.
  pub fn edges(&self) -> &BTreeMap<ProcessKey, BTreeSet<ProcessKey>> {
    &self.edges
  }
}

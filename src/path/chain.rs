//! One concrete chain of processes.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{error, info, instrument, warn};

use crate::config::PathConfig;
use crate::error::{EngineError, Result};
use crate::metrics::ActivePaths;
use crate::process::{EngineRelay, Process};
use crate::types::{
  ActivityCell, Network, PathActivity, PathId, PathType, ProcessKind, ProcessState,
};

/// Ordered processes realizing one topic path for one network and path type.
///
/// Processes are stored in data-flow order: the first is the root reader,
/// the last is the terminal process that feeds the engine relay.
pub struct Path {
  id: PathId,
  config: PathConfig,
  processes: Vec<Arc<Process>>,
  activity: ActivityCell,
  gauge: Option<ActivePaths>,
}

impl Path {
  pub fn new(id: PathId, config: PathConfig, processes: Vec<Arc<Process>>) -> Result<Self> {
    if processes.is_empty() {
      return Err(EngineError::EmptyPath);
    }
    Ok(Self {
      id,
      config,
      processes,
      activity: ActivityCell::new(PathActivity::Inactive),
      gauge: None,
    })
  }

  /// Reports this path's entries into and out of `Active` to `gauge`,
  /// including crashes observed inside process tasks.
  pub fn with_active_gauge(mut self, gauge: ActivePaths) -> Self {
    self.gauge = Some(gauge);
    self
  }

  pub fn id(&self) -> PathId {
    self.id
  }

  pub fn network(&self) -> Network {
    self.id.network()
  }

  pub fn path_type(&self) -> PathType {
    self.id.path_type()
  }

  pub fn config(&self) -> &PathConfig {
    &self.config
  }

  /// True when the client configuration asks for historical blocks.
  pub fn backfill(&self) -> bool {
    self.config.client.backfill()
  }

  pub fn processes(&self) -> &[Arc<Process>] {
    &self.processes
  }

  pub fn len(&self) -> usize {
    self.processes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.processes.is_empty()
  }

  pub fn root(&self) -> &Arc<Process> {
    &self.processes[0]
  }

  pub fn terminal(&self) -> &Arc<Process> {
    &self.processes[self.processes.len() - 1]
  }

  pub fn activity(&self) -> PathActivity {
    self.activity.get()
  }

  /// Attaches the engine relay to the terminal process.
  pub fn add_engine_relay(&self, relay: EngineRelay) -> Result<()> {
    self.terminal().add_engine_relay(relay)
  }

  /// Spawns one task per process on `tracker` and marks the path active.
  ///
  /// Activation is optimistic: a reader that fails later marks the path
  /// crashed from inside its own task. Siblings keep running.
  #[instrument(level = "trace", skip(self, tracker), fields(path_id = %self.id))]
  pub fn run(&self, tracker: &TaskTracker) -> Result<()> {
    if !self
      .activity
      .transition(PathActivity::Inactive, PathActivity::Active)
    {
      return Err(EngineError::PathAlreadyStarted(self.id));
    }
    if let Some(gauge) = &self.gauge {
      gauge.inc();
    }
    for process in &self.processes {
      let process = process.clone();
      let activity = self.activity.clone();
      let gauge = self.gauge.clone();
      let path_id = self.id;
      tracker.spawn(async move {
        if let Err(e) = process.event_loop().await {
          error!(%path_id, process_id = %process.id(), error = %e, "process task failed");
          if activity.transition(PathActivity::Active, PathActivity::Crashed)
            && let Some(gauge) = &gauge
          {
            gauge.dec();
          }
        }
      });
    }
    info!(processes = self.processes.len(), "path running");
    Ok(())
  }

  /// Closes every process that is not yet terminated, in order.
  ///
  /// A failing process does not stop the sequence; all failures come back
  /// together as [EngineError::Close]. The path is terminated only when
  /// every close succeeded.
  #[instrument(level = "trace", skip(self), fields(path_id = %self.id))]
  pub fn close(&self) -> Result<()> {
    let mut failures = Vec::new();
    for process in &self.processes {
      if process.state() == ProcessState::Terminated {
        continue;
      }
      if let Err(e) = process.close() {
        warn!(process_id = %process.id(), error = %e, "process close failed");
        failures.push((process.id(), e));
      }
    }
    if !failures.is_empty() {
      return Err(EngineError::Close(failures));
    }
    if self.activity.swap(PathActivity::Terminated) == PathActivity::Active
      && let Some(gauge) = &self.gauge
    {
      gauge.dec();
    }
    info!("path closed");
    Ok(())
  }

  /// Last height reported by the root reader.
  pub fn block_height(&self) -> Result<u64> {
    let root = self.root();
    if root.kind() != ProcessKind::Reader {
      return Err(EngineError::NotHeightAware(self.id));
    }
    root.height().ok_or(EngineError::NotHeightAware(self.id))
  }
}

impl std::fmt::Debug for Path {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Path")
      .field("id", &self.id)
      .field("processes", &self.processes.len())
      .field("activity", &self.activity.get())
      .finish()
  }
}

//! ETL manager: builds paths from topic requests, reuses mergeable ones,
//! runs them and relays their output into the heuristic engine.
//!
//! - [Etl::create_process_path]: resolve, build, merge-or-register.
//! - [Etl::run] / [Etl::shutdown]: path lifecycle; shutdown waits for every task.
//! - [Etl::deploy_heuristic]: bind a heuristic to a path's output.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use crate::client::ChainClients;
use crate::config::{EngineConfig, PathConfig, PathStateConfig};
use crate::engine::{Heuristic, HeuristicEngine, HeuristicStore};
use crate::error::{EngineError, Result};
use crate::graph::ProcessGraph;
use crate::metrics::{self, ActivePaths, SharedMetrics};
use crate::path::{Analyzer, DefaultAnalyzer, Path, PathStore};
use crate::process::{EngineRelay, Process};
use crate::registry::{BuildContext, Constructor, TopicRegistry};
use crate::state::{MemoryStateStore, StateStore};
use crate::types::{
  Alert, HeuristicId, HeuristicInput, PathActivity, PathId, Severity, StateKey,
};

/// Options for [Etl::new]. Every field has a default.
pub struct EtlOptions {
  pub config: EngineConfig,
  pub state: Arc<dyn StateStore>,
  pub metrics: SharedMetrics,
  pub analyzer: Box<dyn Analyzer>,
  /// Alert subsystem ingress. When unset the manager creates the channel and
  /// hands out the receiver through [Etl::take_alerts].
  pub alerts: Option<mpsc::Sender<Alert>>,
}

impl Default for EtlOptions {
  fn default() -> Self {
    Self {
      config: EngineConfig::default(),
      state: Arc::new(MemoryStateStore::new()),
      metrics: metrics::noop(),
      analyzer: Box::new(DefaultAnalyzer),
      alerts: None,
    }
  }
}

/// Engine that has not been started yet.
struct PendingEngine {
  engine: HeuristicEngine,
  ingress: mpsc::Receiver<HeuristicInput>,
}

/// Owns every path, the graph that wires them and the heuristic engine.
///
/// Path construction and shutdown go through `&mut self`; the graph and the
/// store are never mutated concurrently.
pub struct Etl {
  config: EngineConfig,
  registry: TopicRegistry,
  clients: ChainClients,
  state: Arc<dyn StateStore>,
  metrics: SharedMetrics,
  active: ActivePaths,
  analyzer: Box<dyn Analyzer>,
  graph: ProcessGraph,
  store: PathStore,
  heuristics: Arc<HeuristicStore>,
  ingress: mpsc::Sender<HeuristicInput>,
  pending: Option<PendingEngine>,
  alerts_rx: Option<mpsc::Receiver<Alert>>,
  tracker: TaskTracker,
  cancel: CancellationToken,
}

impl Etl {
  pub fn new(registry: TopicRegistry, clients: ChainClients, options: EtlOptions) -> Result<Self> {
    let EtlOptions {
      config,
      state,
      metrics,
      analyzer,
      alerts,
    } = options;
    config.validate()?;

    let (alerts, alerts_rx) = match alerts {
      Some(tx) => (tx, None),
      None => {
        let (tx, rx) = mpsc::channel(config.alert_buffer);
        (tx, Some(rx))
      }
    };
    let (ingress, ingress_rx) = mpsc::channel(config.engine_ingress_buffer);
    let heuristics = Arc::new(HeuristicStore::new());
    let engine = HeuristicEngine::new(heuristics.clone(), alerts, metrics.clone());

    Ok(Self {
      config,
      registry,
      clients,
      state,
      active: ActivePaths::new(metrics.clone()),
      metrics,
      analyzer,
      graph: ProcessGraph::new(),
      store: PathStore::new(),
      heuristics,
      ingress,
      pending: Some(PendingEngine {
        engine,
        ingress: ingress_rx,
      }),
      alerts_rx,
      tracker: TaskTracker::new(),
      cancel: CancellationToken::new(),
    })
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub fn registry(&self) -> &TopicRegistry {
    &self.registry
  }

  pub fn graph(&self) -> &ProcessGraph {
    &self.graph
  }

  pub fn store(&self) -> &PathStore {
    &self.store
  }

  pub fn heuristics(&self) -> &Arc<HeuristicStore> {
    &self.heuristics
  }

  /// Receiver of the alert channel created when no alert ingress was given.
  pub fn take_alerts(&mut self) -> Option<mpsc::Receiver<Alert>> {
    self.alerts_rx.take()
  }

  /// Builds the path requested by `config`, or reuses a running equivalent.
  ///
  /// Returns the id of the path serving the request and whether it was
  /// reused. A reused path is already registered and keeps its lifecycle:
  /// if it is running, do not [Etl::run] it again (that returns
  /// [EngineError::PathAlreadyStarted]). On error neither the graph nor the
  /// store is modified.
  #[instrument(level = "trace", skip(self, config), fields(network = %config.network, topic = %config.topic, path_type = %config.path_type))]
  pub async fn create_process_path(&mut self, config: PathConfig) -> Result<(PathId, bool)> {
    config.validate()?;
    let topic_path = self.registry.topic_path(config.topic)?;
    let class = topic_path.path_class(config.path_type, config.network);
    let id = PathId::new(class);

    let interval = config
      .client
      .poll_interval(self.config.default_poll_interval());
    let mut processes = Vec::with_capacity(topic_path.len());
    for spec in topic_path.topics() {
      let process_id = spec.process_id(config.path_type, config.network);
      let state_key = spec.state_key.as_ref().map(|k| k.bind(id));
      let ctx = BuildContext {
        process_id,
        path_id: id,
        network: config.network,
        clients: &self.clients,
        state: self.state.clone(),
        state_key: state_key.clone(),
        client_config: &config.client,
        engine_config: &self.config,
      };
      let process = match &spec.constructor {
        Constructor::Reader(ctor) => {
          Process::reader(process_id, id, ctor(&ctx)?, interval, self.metrics.clone())
        }
        Constructor::Subscriber(ctor) => {
          let upstream = spec
            .dependencies
            .first()
            .copied()
            .ok_or(EngineError::Construction {
              topic: spec.topic,
              reason: "subscriber without upstream topic".to_string(),
            })?;
          Process::subscriber(
            process_id,
            id,
            upstream,
            ctor(&ctx)?,
            self.config.channel_buffer,
            self.metrics.clone(),
          )
        }
      };
      let process = match state_key {
        Some(key) => process.with_state_key(key),
        None => process,
      };
      processes.push(Arc::new(process));
    }
    let path = Path::new(id, config, processes)?
      .with_active_gauge(self.active.clone());

    let candidates = self.store.get_existing_paths(&class);
    if let Some(existing) = candidates.iter().find(|existing| {
      !matches!(
        existing.activity(),
        PathActivity::Crashed | PathActivity::Terminated
      ) && self.analyzer.mergeable(existing, &path)
    }) {
      if let Some(state) = &path.config().state {
        self.seed_state(existing, state).await?;
      }
      info!(path_id = %existing.id(), "reusing mergeable path");
      return Ok((existing.id(), true));
    }

    if let Some(state) = &path.config().state {
      self.seed_state(&path, state).await?;
    }
    self.graph.add_many(path.processes())?;
    path.add_engine_relay(EngineRelay::new(
      id,
      self.ingress.clone(),
      self.metrics.clone(),
    ))?;
    self.store.add_path(Arc::new(path));
    info!(path_id = %id, "path registered");
    Ok((id, false))
  }

  /// Writes tracked addresses and event signatures under the path's bound
  /// state keys. Nesting keys list addresses, each child key its signatures.
  async fn seed_state(&self, path: &Path, state: &PathStateConfig) -> Result<()> {
    let keys: Vec<&StateKey> = path
      .processes()
      .iter()
      .filter_map(|p| p.state_key())
      .collect();
    for key in keys {
      for address in &state.addresses {
        let address = address.to_lowercase();
        self.state.set_slice(key, &address).await?;
        if key.nesting {
          let child = key.child(&address);
          for signature in &state.event_signatures {
            self.state.set_slice(&child, &signature.to_lowercase()).await?;
          }
        }
      }
      debug!(%key, addresses = state.addresses.len(), "state seeded");
    }
    Ok(())
  }

  /// Starts the path's process tasks, and the heuristic engine on first use.
  #[instrument(level = "trace", skip(self))]
  pub fn run(&mut self, id: PathId) -> Result<()> {
    let path = self.store.get_path_by_id(&id)?;
    if let Some(PendingEngine { engine, ingress }) = self.pending.take() {
      self
        .tracker
        .spawn(engine.event_loop(ingress, self.cancel.clone()));
    }
    path.run(&self.tracker)
  }

  /// Closes every path, stops the engine and waits for all tasks to exit.
  /// Close failures are collected across paths and returned together.
  #[instrument(level = "trace", skip(self))]
  pub async fn shutdown(&mut self) -> Result<()> {
    let mut failures = Vec::new();
    for path in self.store.paths() {
      if path.activity() == PathActivity::Terminated {
        continue;
      }
      match path.close() {
        Ok(()) => {}
        Err(EngineError::Close(errs)) => failures.extend(errs),
        Err(e) => warn!(path_id = %path.id(), error = %e, "path close failed"),
      }
    }
    self.cancel.cancel();
    self.tracker.close();
    self.tracker.wait().await;
    info!(paths = self.store.len(), "etl shut down");
    if failures.is_empty() {
      Ok(())
    } else {
      Err(EngineError::Close(failures))
    }
  }

  pub fn active_count(&self) -> usize {
    self.store.active_count()
  }

  /// Height last reported by the path's root reader.
  pub fn block_height(&self, id: PathId) -> Result<u64> {
    self.store.get_path_by_id(&id)?.block_height()
  }

  pub fn path_activity(&self, id: PathId) -> Result<PathActivity> {
    Ok(self.store.get_path_by_id(&id)?.activity())
  }

  /// Binds `heuristic` to the output of path `id`. The heuristic must consume
  /// the topic the path's terminal process emits.
  #[instrument(level = "trace", skip(self, heuristic), fields(heuristic = heuristic.name()))]
  pub fn deploy_heuristic(
    &self,
    id: PathId,
    heuristic: Arc<dyn Heuristic>,
    severity: Severity,
  ) -> Result<HeuristicId> {
    let path = self.store.get_path_by_id(&id)?;
    let terminal = path.terminal();
    if heuristic.input_topic() != terminal.emits() {
      return Err(EngineError::TopicMismatch {
        process: terminal.id(),
        expected: terminal.emits(),
        actual: heuristic.input_topic(),
      });
    }
    Ok(self.heuristics.deploy(id, heuristic, severity))
  }
}

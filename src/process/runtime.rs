//! Runtime unit of a path: one reader or subscriber task.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::definition::{ReadDefinition, TransformDefinition};
use super::relay::EngineRelay;
use crate::error::{EngineError, Result};
use crate::metrics::SharedMetrics;
use crate::types::{
  Event, PathId, ProcessId, ProcessKey, ProcessKind, ProcessState, StateKey, TopicType,
};

const NO_HEIGHT: u64 = u64::MAX;

/// What drives the event loop. Taken out of the process when the loop starts.
enum Driver {
  Reader {
    definition: Box<dyn ReadDefinition>,
    interval: Duration,
  },
  Subscriber {
    definition: Box<dyn TransformDefinition>,
    entry: mpsc::Receiver<Event>,
  },
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A reader or subscriber owned by exactly one path.
///
/// Lifecycle: `Inactive` at construction, `Live` once [Process::event_loop]
/// starts, `Terminated` on [Process::close] or when the loop ends.
pub struct Process {
  key: ProcessKey,
  path_id: PathId,
  emits: TopicType,
  consumes: Option<TopicType>,
  state_key: Option<StateKey>,
  state: AtomicU8,
  height: AtomicU64,
  entry_tx: Option<mpsc::Sender<Event>>,
  subscribers: Mutex<BTreeMap<ProcessKey, mpsc::Sender<Event>>>,
  relay: Mutex<Option<EngineRelay>>,
  driver: Mutex<Option<Driver>>,
  cancel: CancellationToken,
  metrics: SharedMetrics,
}

impl Process {
  /// New reader emitting `emits`, stepping `definition` every `interval`.
  pub fn reader(
    id: ProcessId,
    path_id: PathId,
    definition: Box<dyn ReadDefinition>,
    interval: Duration,
    metrics: SharedMetrics,
  ) -> Self {
    Self {
      key: ProcessKey::new(id, path_id.instance),
      path_id,
      emits: id.topic,
      consumes: None,
      state_key: None,
      state: AtomicU8::new(ProcessState::Inactive as u8),
      height: AtomicU64::new(NO_HEIGHT),
      entry_tx: None,
      subscribers: Mutex::new(BTreeMap::new()),
      relay: Mutex::new(None),
      driver: Mutex::new(Some(Driver::Reader {
        definition,
        interval,
      })),
      cancel: CancellationToken::new(),
      metrics,
    }
  }

  /// New subscriber consuming `consumes` through a channel of `buffer` slots.
  pub fn subscriber(
    id: ProcessId,
    path_id: PathId,
    consumes: TopicType,
    definition: Box<dyn TransformDefinition>,
    buffer: usize,
    metrics: SharedMetrics,
  ) -> Self {
    let (entry_tx, entry) = mpsc::channel(buffer.max(1));
    Self {
      key: ProcessKey::new(id, path_id.instance),
      path_id,
      emits: id.topic,
      consumes: Some(consumes),
      state_key: None,
      state: AtomicU8::new(ProcessState::Inactive as u8),
      height: AtomicU64::new(NO_HEIGHT),
      entry_tx: Some(entry_tx),
      subscribers: Mutex::new(BTreeMap::new()),
      relay: Mutex::new(None),
      driver: Mutex::new(Some(Driver::Subscriber { definition, entry })),
      cancel: CancellationToken::new(),
      metrics,
    }
  }

  /// Binds the process to a path-scoped state key.
  pub fn with_state_key(mut self, key: StateKey) -> Self {
    self.state_key = Some(key);
    self
  }

  pub fn id(&self) -> ProcessId {
    self.key.id
  }

  pub fn key(&self) -> ProcessKey {
    self.key
  }

  pub fn path_id(&self) -> PathId {
    self.path_id
  }

  pub fn kind(&self) -> ProcessKind {
    self.key.id.kind
  }

  /// Topic of the events this process publishes.
  pub fn emits(&self) -> TopicType {
    self.emits
  }

  /// Topic this process consumes; `None` for readers.
  pub fn consumes(&self) -> Option<TopicType> {
    self.consumes
  }

  pub fn state_key(&self) -> Option<&StateKey> {
    self.state_key.as_ref()
  }

  pub fn state(&self) -> ProcessState {
    ProcessState::from_u8(self.state.load(Ordering::Acquire))
  }

  /// Height last reported by a height-aware reader.
  pub fn height(&self) -> Option<u64> {
    match self.height.load(Ordering::Acquire) {
      NO_HEIGHT => None,
      h => Some(h),
    }
  }

  /// Channel feeding this subscriber with events of `topic`.
  pub fn entry_channel(&self, topic: TopicType) -> Result<mpsc::Sender<Event>> {
    let (Some(expected), Some(tx)) = (self.consumes, &self.entry_tx) else {
      return Err(EngineError::NoEntryChannel(self.key.id));
    };
    if expected != topic {
      return Err(EngineError::TopicMismatch {
        process: self.key.id,
        expected,
        actual: topic,
      });
    }
    Ok(tx.clone())
  }

  pub fn add_subscriber(&self, key: ProcessKey, tx: mpsc::Sender<Event>) -> Result<()> {
    let mut subs = lock(&self.subscribers);
    if subs.contains_key(&key) {
      return Err(EngineError::SubscriberExists(key));
    }
    subs.insert(key, tx);
    Ok(())
  }

  pub fn remove_subscriber(&self, key: &ProcessKey) -> Result<()> {
    lock(&self.subscribers)
      .remove(key)
      .map(|_| ())
      .ok_or(EngineError::SubscriberNotFound(*key))
  }

  pub fn subscriber_count(&self) -> usize {
    lock(&self.subscribers).len()
  }

  /// Attaches the engine relay. At most one per process.
  pub fn add_engine_relay(&self, relay: EngineRelay) -> Result<()> {
    let mut slot = lock(&self.relay);
    if slot.is_some() {
      return Err(EngineError::RelayExists(self.key.id));
    }
    *slot = Some(relay);
    Ok(())
  }

  pub fn has_engine_relay(&self) -> bool {
    lock(&self.relay).is_some()
  }

  /// Signals shutdown. Fails if the process is already terminated.
  #[instrument(level = "trace", skip(self), fields(process_id = %self.key.id))]
  pub fn close(&self) -> Result<()> {
    let prev = self
      .state
      .swap(ProcessState::Terminated as u8, Ordering::AcqRel);
    if ProcessState::from_u8(prev) == ProcessState::Terminated {
      return Err(EngineError::ProcessTerminated(self.key.id));
    }
    self.cancel.cancel();
    debug!(path_id = %self.path_id, "process closed");
    Ok(())
  }

  fn terminate(&self) {
    self
      .state
      .store(ProcessState::Terminated as u8, Ordering::Release);
    self.cancel.cancel();
  }

  /// Runs until closed. Readers step their definition on every tick;
  /// subscribers transform each event from their entry channel. Either way,
  /// results go to every subscriber and to the engine relay.
  ///
  /// Returns `Err` only for fatal reader failures.
  #[instrument(level = "trace", skip(self), fields(process_id = %self.key.id, path_id = %self.path_id))]
  pub async fn event_loop(&self) -> Result<()> {
    let driver = lock(&self.driver)
      .take()
      .ok_or(EngineError::AlreadyRunning(self.key.id))?;
    let _ = self.state.compare_exchange(
      ProcessState::Inactive as u8,
      ProcessState::Live as u8,
      Ordering::AcqRel,
      Ordering::Acquire,
    );
    info!("process event loop starting");

    let result = match driver {
      Driver::Reader {
        definition,
        interval,
      } => self.run_reader(definition, interval).await,
      Driver::Subscriber { definition, entry } => self.run_subscriber(definition, entry).await,
    };
    self.terminate();
    info!("process event loop stopped");
    result
  }

  async fn run_reader(
    &self,
    mut definition: Box<dyn ReadDefinition>,
    interval: Duration,
  ) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
      tokio::select! {
        biased;
        _ = self.cancel.cancelled() => return Ok(()),
        _ = ticker.tick() => {}
      }
      let read = tokio::select! {
        biased;
        _ = self.cancel.cancelled() => return Ok(()),
        r = definition.read() => r,
      };
      let events = match read {
        Ok(events) => events,
        Err(e) => {
          error!(process_id = %self.key.id, error = %e, "reader failed");
          self.metrics.inc_process_crashes(&self.key.id);
          return Err(e);
        }
      };
      if let Some(h) = definition.height() {
        self.height.store(h, Ordering::Release);
      }
      for event in events {
        if !self.publish(event).await {
          return Ok(());
        }
      }
      if definition.finished() {
        info!(process_id = %self.key.id, "reader finished its range");
        return Ok(());
      }
    }
  }

  async fn run_subscriber(
    &self,
    mut definition: Box<dyn TransformDefinition>,
    mut entry: mpsc::Receiver<Event>,
  ) -> Result<()> {
    loop {
      let event = tokio::select! {
        biased;
        _ = self.cancel.cancelled() => return Ok(()),
        ev = entry.recv() => match ev {
          Some(ev) => ev,
          None => return Ok(()),
        },
      };
      match definition.transform(event).await {
        Ok(events) => {
          for event in events {
            if !self.publish(event).await {
              return Ok(());
            }
          }
        }
        Err(e) => {
          warn!(process_id = %self.key.id, error = %e, "dropping event after transform failure");
        }
      }
    }
  }

  /// Sends `event` to every subscriber, then to the relay, waiting on each.
  /// Returns false when the process was closed while blocked.
  async fn publish(&self, event: Event) -> bool {
    let targets: Vec<(ProcessKey, mpsc::Sender<Event>)> = lock(&self.subscribers)
      .iter()
      .map(|(k, tx)| (*k, tx.clone()))
      .collect();
    for (key, tx) in targets {
      tokio::select! {
        biased;
        _ = self.cancel.cancelled() => return false,
        sent = tx.send(event.clone()) => {
          if sent.is_err() {
            warn!(process_id = %self.key.id, subscriber = %key, "subscriber channel closed");
          }
        }
      }
    }
    let relay = lock(&self.relay).clone();
    if let Some(relay) = relay {
      tokio::select! {
        biased;
        _ = self.cancel.cancelled() => return false,
        sent = relay.relay(event) => {
          if let Err(e) = sent {
            warn!(process_id = %self.key.id, error = %e, "engine relay failed");
          }
        }
      }
    }
    self.metrics.inc_events_published(&self.key.id, 1);
    true
  }
}

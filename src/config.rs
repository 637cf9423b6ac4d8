//! Engine and path configuration.
//!
//! [EngineConfig] sizes channels and sets defaults for every path; it loads from
//! `CHAINWEAVE_*` environment variables or a JSON file (see [crate::config_io]).
//! [PathConfig] describes one `(network, topic, path type)` request.

use std::env;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{EngineError, Result};
use crate::types::{Network, PathType, TopicType};

static ADDRESS_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static regex"));

static SIGNATURE_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("static regex"));

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Capacity of each process-to-process channel.
  pub channel_buffer: usize,
  /// Capacity of the shared heuristic engine ingress channel.
  pub engine_ingress_buffer: usize,
  /// Capacity of the alert channel handed to the alert subsystem.
  pub alert_buffer: usize,
  /// Reader poll interval when a path does not set one.
  pub default_poll_interval_ms: u64,
  /// Upper bound of headers fetched per reader tick.
  pub max_backfill_batch: u64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      channel_buffer: 100,
      engine_ingress_buffer: 1_000,
      alert_buffer: 100,
      default_poll_interval_ms: 1_000,
      max_backfill_batch: 100,
    }
  }
}

impl EngineConfig {
  /// Loads configuration from environment variables, falling back to defaults.
  ///
  /// - `CHAINWEAVE_CHANNEL_BUFFER`
  /// - `CHAINWEAVE_ENGINE_INGRESS_BUFFER`
  /// - `CHAINWEAVE_ALERT_BUFFER`
  /// - `CHAINWEAVE_POLL_INTERVAL_MS`
  /// - `CHAINWEAVE_MAX_BACKFILL_BATCH`
  pub fn from_env() -> Self {
    let d = Self::default();
    Self {
      channel_buffer: env_or("CHAINWEAVE_CHANNEL_BUFFER", d.channel_buffer),
      engine_ingress_buffer: env_or("CHAINWEAVE_ENGINE_INGRESS_BUFFER", d.engine_ingress_buffer),
      alert_buffer: env_or("CHAINWEAVE_ALERT_BUFFER", d.alert_buffer),
      default_poll_interval_ms: env_or("CHAINWEAVE_POLL_INTERVAL_MS", d.default_poll_interval_ms),
      max_backfill_batch: env_or("CHAINWEAVE_MAX_BACKFILL_BATCH", d.max_backfill_batch),
    }
  }

  /// Rejects zero-sized channels and intervals.
  #[instrument(level = "trace")]
  pub fn validate(&self) -> Result<()> {
    if self.channel_buffer == 0 || self.engine_ingress_buffer == 0 || self.alert_buffer == 0 {
      return Err(EngineError::Config("channel buffers must be non-zero".to_string()));
    }
    if self.default_poll_interval_ms == 0 {
      return Err(EngineError::Config("poll interval must be non-zero".to_string()));
    }
    if self.max_backfill_batch == 0 {
      return Err(EngineError::Config("backfill batch must be non-zero".to_string()));
    }
    Ok(())
  }

  pub fn default_poll_interval(&self) -> Duration {
    Duration::from_millis(self.default_poll_interval_ms)
  }
}

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
  env::var(key)
    .ok()
    .and_then(|s| s.parse().ok())
    .unwrap_or(default)
}

/// Chain client options for one path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  pub poll_interval_ms: Option<u64>,
  /// First height to read. Setting it requests a backfill.
  pub start_height: Option<u64>,
  /// Last height to read; the reader finishes after it.
  pub end_height: Option<u64>,
  /// Headers fetched per tick; capped by [EngineConfig::max_backfill_batch].
  pub batch_size: Option<u64>,
}

impl ClientConfig {
  /// True when the path starts from a historical height.
  pub fn backfill(&self) -> bool {
    self.start_height.is_some()
  }

  pub fn poll_interval(&self, default: Duration) -> Duration {
    self
      .poll_interval_ms
      .map(Duration::from_millis)
      .unwrap_or(default)
  }
}

/// Working set seeded into the state store for stateful topics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathStateConfig {
  /// `0x`-prefixed 20-byte addresses.
  pub addresses: Vec<String>,
  /// `0x`-prefixed 32-byte event signature hashes applied to every address.
  pub event_signatures: Vec<String>,
}

impl PathStateConfig {
  pub fn validate(&self) -> Result<()> {
    if let Some(bad) = self.addresses.iter().find(|a| !ADDRESS_RE.is_match(a)) {
      return Err(EngineError::Config(format!("invalid address: {}", bad)));
    }
    if let Some(bad) = self
      .event_signatures
      .iter()
      .find(|s| !SIGNATURE_RE.is_match(s))
    {
      return Err(EngineError::Config(format!("invalid event signature: {}", bad)));
    }
    Ok(())
  }
}

/// Request for one process path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
  pub network: Network,
  pub path_type: PathType,
  pub topic: TopicType,
  #[serde(default)]
  pub client: ClientConfig,
  #[serde(default)]
  pub state: Option<PathStateConfig>,
}

impl PathConfig {
  pub fn new(network: Network, topic: TopicType, path_type: PathType) -> Self {
    Self {
      network,
      path_type,
      topic,
      client: ClientConfig::default(),
      state: None,
    }
  }

  pub fn with_client(mut self, client: ClientConfig) -> Self {
    self.client = client;
    self
  }

  pub fn with_state(mut self, state: PathStateConfig) -> Self {
    self.state = Some(state);
    self
  }

  /// Backtests need a bounded range; ranges must be ordered.
  #[instrument(level = "trace")]
  pub fn validate(&self) -> Result<()> {
    if self.path_type == PathType::Backtest
      && (self.client.start_height.is_none() || self.client.end_height.is_none())
    {
      return Err(EngineError::Config(
        "backtest paths require start_height and end_height".to_string(),
      ));
    }
    if let (Some(start), Some(end)) = (self.client.start_height, self.client.end_height)
      && end < start
    {
      return Err(EngineError::Config(format!(
        "end_height {} precedes start_height {}",
        end, start
      )));
    }
    if self.client.poll_interval_ms == Some(0) {
      return Err(EngineError::Config("poll interval must be non-zero".to_string()));
    }
    if let Some(state) = &self.state {
      state.validate()?;
    }
    Ok(())
  }
}

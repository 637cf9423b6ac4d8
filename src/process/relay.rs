//! Bridge from a path's terminal process into the heuristic engine.

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::instrument;

use crate::error::{EngineError, Result};
use crate::metrics::SharedMetrics;
use crate::types::{Event, HeuristicInput, PathId};

/// Wraps every event with the owning path id and sends it on the engine's
/// shared ingress channel.
#[derive(Clone)]
pub struct EngineRelay {
  path_id: PathId,
  ingress: mpsc::Sender<HeuristicInput>,
  metrics: SharedMetrics,
}

impl EngineRelay {
  pub fn new(path_id: PathId, ingress: mpsc::Sender<HeuristicInput>, metrics: SharedMetrics) -> Self {
    Self {
      path_id,
      ingress,
      metrics,
    }
  }

  pub fn path_id(&self) -> PathId {
    self.path_id
  }

  /// Blocks until the engine accepts the input.
  #[instrument(level = "trace", skip(self, event), fields(path_id = %self.path_id))]
  pub async fn relay(&self, event: Event) -> Result<()> {
    let produced_at = event.timestamp;
    self
      .ingress
      .send(HeuristicInput {
        path_id: self.path_id,
        input: event,
      })
      .await
      .map_err(|_| EngineError::ChannelClosed("heuristic engine ingress".to_string()))?;
    if let Ok(latency) = (Utc::now() - produced_at).to_std() {
      self.metrics.observe_relay_latency(&self.path_id, latency);
    }
    Ok(())
  }
}

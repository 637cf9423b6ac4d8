//! Dispatch loop from the shared ingress channel to deployed heuristics.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::HeuristicStore;
use crate::metrics::SharedMetrics;
use crate::types::{Alert, HeuristicInput};

/// Single consumer of every path's relayed output.
pub struct HeuristicEngine {
  store: Arc<HeuristicStore>,
  alerts: mpsc::Sender<Alert>,
  metrics: SharedMetrics,
}

impl HeuristicEngine {
  pub fn new(
    store: Arc<HeuristicStore>,
    alerts: mpsc::Sender<Alert>,
    metrics: SharedMetrics,
  ) -> Self {
    Self {
      store,
      alerts,
      metrics,
    }
  }

  /// Runs every heuristic deployed for the input's path and topic. A failing
  /// heuristic is logged and skipped. Returns the number of alerts sent.
  ///
  /// Alerts still waiting for room when `cancel` fires are dropped.
  #[instrument(level = "trace", skip(self, input, cancel), fields(path_id = %input.path_id, topic = %input.input.topic))]
  pub async fn dispatch(&self, input: &HeuristicInput, cancel: &CancellationToken) -> usize {
    let topic = input.input.topic;
    let deployments = self.store.lookup(input.path_id, topic);
    if deployments.is_empty() {
      debug!("no heuristics deployed");
      return 0;
    }

    let mut sent = 0;
    for deployment in deployments {
      self.metrics.inc_heuristic_runs(topic);
      let name = deployment.heuristic.name().to_string();
      let activation = match deployment.heuristic.assess(input).await {
        Ok(Some(a)) => a,
        Ok(None) => continue,
        Err(e) => {
          warn!(heuristic_id = %deployment.id, heuristic = %name, error = %e, "heuristic failed");
          self.metrics.inc_heuristic_failures(&name);
          continue;
        }
      };
      let alert = Alert {
        severity: deployment.severity,
        path_id: input.path_id,
        heuristic_id: deployment.id,
        heuristic_name: name,
        timestamp: Utc::now(),
        message: activation.message,
      };
      if self.deliver(alert, cancel).await {
        self.metrics.inc_alerts(deployment.severity);
        sent += 1;
      }
    }
    sent
  }

  /// Sends without blocking when possible; waits only when the alert
  /// subsystem is full, and gives up once `cancel` fires.
  async fn deliver(&self, alert: Alert, cancel: &CancellationToken) -> bool {
    match self.alerts.try_send(alert) {
      Ok(()) => true,
      Err(TrySendError::Full(alert)) => {
        warn!(heuristic_id = %alert.heuristic_id, "alert ingress full, waiting");
        let heuristic_id = alert.heuristic_id;
        tokio::select! {
          biased;
          _ = cancel.cancelled() => {
            warn!(%heuristic_id, "engine cancelled while alert ingress full, dropping alert");
            false
          }
          sent = self.alerts.send(alert) => sent.is_ok(),
        }
      }
      Err(TrySendError::Closed(alert)) => {
        error!(heuristic_id = %alert.heuristic_id, "alert ingress closed, dropping alert");
        false
      }
    }
  }

  /// Dispatches inputs until `cancel` fires or every relay is dropped.
  pub async fn event_loop(
    self,
    mut ingress: mpsc::Receiver<HeuristicInput>,
    cancel: CancellationToken,
  ) {
    info!("heuristic engine starting");
    loop {
      let input = tokio::select! {
        biased;
        _ = cancel.cancelled() => break,
        input = ingress.recv() => match input {
          Some(input) => input,
          None => break,
        },
      };
      self.dispatch(&input, &cancel).await;
    }
    info!("heuristic engine stopped");
  }
}

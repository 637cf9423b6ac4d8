//! Reader walking block headers forward.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, warn};

use super::ReadDefinition;
use crate::client::ChainClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::{Event, Network, TopicType};

/// Emits one `BlockHeader` event per block, in height order.
///
/// Starts at `start_height` when set (backfill), otherwise at the tip seen on
/// the first tick. Reads at most `batch` headers per tick and finishes after
/// `end_height`. Client failures are logged and retried on the next tick.
pub struct BlockTraversal {
  network: Network,
  client: Arc<dyn ChainClient>,
  next: Option<u64>,
  end: Option<u64>,
  batch: u64,
  height: Option<u64>,
}

impl BlockTraversal {
  pub fn new(
    network: Network,
    client: Arc<dyn ChainClient>,
    config: &ClientConfig,
    max_batch: u64,
  ) -> Self {
    let batch = config
      .batch_size
      .unwrap_or(max_batch)
      .min(max_batch)
      .max(1);
    Self {
      network,
      client,
      next: config.start_height,
      end: config.end_height,
      batch,
      height: None,
    }
  }
}

#[async_trait]
impl ReadDefinition for BlockTraversal {
  #[instrument(level = "trace", skip(self), fields(network = %self.network))]
  async fn read(&mut self) -> Result<Vec<Event>> {
    if self.finished() {
      return Ok(vec![]);
    }
    let latest = match self.client.latest_height().await {
      Ok(h) => h,
      Err(e) => {
        warn!(network = %self.network, error = %e, "failed to fetch latest height");
        return Ok(vec![]);
      }
    };
    let start = *self.next.get_or_insert(latest);
    if start > latest {
      return Ok(vec![]);
    }
    let mut stop = latest.min(start.saturating_add(self.batch - 1));
    if let Some(end) = self.end {
      stop = stop.min(end);
    }

    let mut events = Vec::new();
    for number in start..=stop {
      match self.client.header_by_number(number).await {
        Ok(header) => {
          events.push(Event::new(self.network, TopicType::BlockHeader, header));
          self.height = Some(number);
          self.next = Some(number + 1);
        }
        Err(e) => {
          warn!(network = %self.network, number, error = %e, "failed to fetch header");
          break;
        }
      }
    }
    Ok(events)
  }

  fn height(&self) -> Option<u64> {
    self.height
  }

  fn finished(&self) -> bool {
    matches!((self.next, self.end), (Some(next), Some(end)) if next > end)
  }
}

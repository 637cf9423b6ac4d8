//! Reader polling balances of tracked addresses.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, warn};

use super::ReadDefinition;
use crate::client::ChainClient;
use crate::error::Result;
use crate::state::StateStore;
use crate::types::{AccountBalance, Event, Network, StateKey, TopicType};

/// Each tick, emits the balance of every address listed under its state key
/// at the current tip.
pub struct BalancePoller {
  network: Network,
  client: Arc<dyn ChainClient>,
  state: Arc<dyn StateStore>,
  key: StateKey,
  height: Option<u64>,
}

impl BalancePoller {
  pub fn new(
    network: Network,
    client: Arc<dyn ChainClient>,
    state: Arc<dyn StateStore>,
    key: StateKey,
  ) -> Self {
    Self {
      network,
      client,
      state,
      key,
      height: None,
    }
  }
}

#[async_trait]
impl ReadDefinition for BalancePoller {
  #[instrument(level = "trace", skip(self), fields(key = %self.key))]
  async fn read(&mut self) -> Result<Vec<Event>> {
    let addresses = match self.state.get_slice(&self.key).await {
      Ok(a) => a,
      Err(e) => {
        warn!(error = %e, "failed to read tracked addresses");
        return Ok(vec![]);
      }
    };
    if addresses.is_empty() {
      return Ok(vec![]);
    }
    let block = match self.client.latest_height().await {
      Ok(h) => h,
      Err(e) => {
        warn!(network = %self.network, error = %e, "failed to fetch latest height");
        return Ok(vec![]);
      }
    };
    self.height = Some(block);

    let mut events = Vec::with_capacity(addresses.len());
    for address in addresses {
      match self.client.balance_of(&address, block).await {
        Ok(balance) => events.push(Event::new(
          self.network,
          TopicType::AccountBalance,
          AccountBalance {
            address,
            block_number: block,
            balance,
          },
        )),
        Err(e) => warn!(%address, error = %e, "failed to fetch balance"),
      }
    }
    Ok(events)
  }

  fn height(&self) -> Option<u64> {
    self.height
  }
}

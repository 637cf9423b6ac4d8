//! Chain client collaborator.
//!
//! Processes never own a client; they receive the handle for their network
//! through the build context at construction time.

mod static_chain;
#[cfg(test)]
mod static_chain_test;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{EngineError, Result};
use crate::types::{BlockHeader, ChainLog, Network};

pub use static_chain::StaticChainClient;

/// Read access to one chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
  /// Height of the chain tip.
  async fn latest_height(&self) -> Result<u64>;

  async fn header_by_number(&self, number: u64) -> Result<BlockHeader>;

  /// Logs emitted in `block` by any of `addresses`.
  async fn logs(&self, block: u64, addresses: &[String]) -> Result<Vec<ChainLog>>;

  /// Native balance of `address` at `block`.
  async fn balance_of(&self, address: &str, block: u64) -> Result<u128>;
}

/// Per-network client handles.
#[derive(Clone, Default)]
pub struct ChainClients {
  clients: HashMap<Network, Arc<dyn ChainClient>>,
}

impl ChainClients {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, network: Network, client: Arc<dyn ChainClient>) -> Self {
    self.clients.insert(network, client);
    self
  }

  pub fn get(&self, network: Network) -> Result<Arc<dyn ChainClient>> {
    self
      .clients
      .get(&network)
      .cloned()
      .ok_or_else(|| EngineError::Client(format!("no client configured for {}", network)))
  }
}

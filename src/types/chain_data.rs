//! Chain data carried as event payloads.

use serde::{Deserialize, Serialize};

/// Block header as returned by a chain client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
  pub number: u64,
  pub hash: String,
  pub parent_hash: String,
  /// Unix seconds.
  pub timestamp: u64,
}

/// Log emitted by a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLog {
  pub address: String,
  /// First entry is the event signature hash.
  pub topics: Vec<String>,
  pub data: String,
  pub block_number: u64,
  pub tx_hash: String,
  pub log_index: u64,
}

impl ChainLog {
  pub fn signature(&self) -> Option<&str> {
    self.topics.first().map(String::as_str)
  }
}

/// Native balance of an address at a block height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
  pub address: String,
  pub block_number: u64,
  pub balance: u128,
}

//! In-memory chain used by tests and the demo binary.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ChainClient;
use crate::error::{EngineError, Result};
use crate::types::{BlockHeader, ChainLog};

#[derive(Default)]
struct Chain {
  headers: BTreeMap<u64, BlockHeader>,
  logs: Vec<ChainLog>,
  balances: HashMap<String, u128>,
}

/// Chain held in memory. Headers are appended with [StaticChainClient::mine] or
/// [StaticChainClient::push_header].
#[derive(Default)]
pub struct StaticChainClient {
  chain: RwLock<Chain>,
  failing: AtomicBool,
}

impl StaticChainClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends `count` synthetic headers after the current tip and returns the new tip.
  pub async fn mine(&self, count: u64) -> u64 {
    let mut chain = self.chain.write().await;
    let mut next = chain.headers.keys().next_back().map(|n| n + 1).unwrap_or(0);
    for _ in 0..count {
      chain.headers.insert(next, synthetic_header(next));
      next += 1;
    }
    next.saturating_sub(1)
  }

  pub async fn push_header(&self, header: BlockHeader) {
    self.chain.write().await.headers.insert(header.number, header);
  }

  pub async fn push_log(&self, log: ChainLog) {
    self.chain.write().await.logs.push(log);
  }

  pub async fn set_balance(&self, address: &str, balance: u128) {
    self
      .chain
      .write()
      .await
      .balances
      .insert(address.to_lowercase(), balance);
  }

  /// While set, every call fails with a client error.
  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::Release);
  }

  fn check(&self) -> Result<()> {
    if self.failing.load(Ordering::Acquire) {
      return Err(EngineError::Client("static chain unavailable".to_string()));
    }
    Ok(())
  }
}

/// Deterministic header for height `n`.
pub(crate) fn synthetic_header(n: u64) -> BlockHeader {
  BlockHeader {
    number: n,
    hash: format!("0x{:064x}", n + 1),
    parent_hash: format!("0x{:064x}", n),
    timestamp: 1_700_000_000 + n * 12,
  }
}

#[async_trait]
impl ChainClient for StaticChainClient {
  async fn latest_height(&self) -> Result<u64> {
    self.check()?;
    self
      .chain
      .read()
      .await
      .headers
      .keys()
      .next_back()
      .copied()
      .ok_or_else(|| EngineError::Client("chain has no blocks".to_string()))
  }

  async fn header_by_number(&self, number: u64) -> Result<BlockHeader> {
    self.check()?;
    self
      .chain
      .read()
      .await
      .headers
      .get(&number)
      .cloned()
      .ok_or_else(|| EngineError::Client(format!("header {} not found", number)))
  }

  async fn logs(&self, block: u64, addresses: &[String]) -> Result<Vec<ChainLog>> {
    self.check()?;
    let chain = self.chain.read().await;
    Ok(
      chain
        .logs
        .iter()
        .filter(|l| l.block_number == block)
        .filter(|l| addresses.iter().any(|a| a.eq_ignore_ascii_case(&l.address)))
        .cloned()
        .collect(),
    )
  }

  async fn balance_of(&self, address: &str, _block: u64) -> Result<u128> {
    self.check()?;
    Ok(
      self
        .chain
        .read()
        .await
        .balances
        .get(&address.to_lowercase())
        .copied()
        .unwrap_or(0),
    )
  }
}

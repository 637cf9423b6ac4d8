//! Tests for `StaticChainClient`.

use super::static_chain::synthetic_header;
use super::{ChainClient, ChainClients, StaticChainClient};
use crate::types::{ChainLog, Network};
use std::sync::Arc;

fn log(address: &str, block: u64) -> ChainLog {
  ChainLog {
    address: address.to_string(),
    topics: vec!["0xsig".to_string()],
    data: "0x".to_string(),
    block_number: block,
    tx_hash: format!("0x{:064x}", block),
    log_index: 0,
  }
}

#[tokio::test]
async fn mine_extends_tip() {
  let c = StaticChainClient::new();
  assert!(c.latest_height().await.is_err());
  assert_eq!(c.mine(3).await, 2);
  assert_eq!(c.mine(2).await, 4);
  assert_eq!(c.latest_height().await.unwrap(), 4);
  assert_eq!(c.header_by_number(4).await.unwrap(), synthetic_header(4));
}

#[tokio::test]
async fn logs_filter_by_block_and_address() {
  let c = StaticChainClient::new();
  c.push_log(log("0xAA", 1)).await;
  c.push_log(log("0xbb", 1)).await;
  c.push_log(log("0xaa", 2)).await;
  let got = c.logs(1, &["0xaa".to_string()]).await.unwrap();
  assert_eq!(got.len(), 1);
  assert_eq!(got[0].address, "0xAA");
  assert!(c.logs(1, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn failing_client_errors() {
  let c = StaticChainClient::new();
  c.mine(1).await;
  c.set_failing(true);
  assert!(c.latest_height().await.is_err());
  c.set_failing(false);
  assert!(c.latest_height().await.is_ok());
}

#[tokio::test]
async fn balances_are_case_insensitive() {
  let c = StaticChainClient::new();
  c.set_balance("0xABC", 5).await;
  assert_eq!(c.balance_of("0xabc", 0).await.unwrap(), 5);
  assert_eq!(c.balance_of("0xdef", 0).await.unwrap(), 0);
}

#[test]
fn clients_lookup_by_network() {
  let clients = ChainClients::new().with(Network::Layer1, Arc::new(StaticChainClient::new()));
  assert!(clients.get(Network::Layer1).is_ok());
  assert!(clients.get(Network::Layer2).is_err());
}

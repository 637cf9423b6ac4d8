//! Tests for `config`.

use crate::config::{ClientConfig, EngineConfig, PathConfig, PathStateConfig};
use crate::types::{Network, PathType, TopicType};

const ADDR: &str = "0x00000000000000000000000000000000000000aa";
const SIG: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

#[test]
fn engine_defaults_are_valid() {
  let cfg = EngineConfig::default();
  assert!(cfg.validate().is_ok());
  assert_eq!(cfg.default_poll_interval().as_millis(), 1_000);
}

#[test]
fn engine_rejects_zero_buffer() {
  let cfg = EngineConfig {
    channel_buffer: 0,
    ..EngineConfig::default()
  };
  assert!(cfg.validate().is_err());
}

#[test]
fn engine_deserializes_partial_json() {
  let cfg: EngineConfig = serde_json::from_str(r#"{"channel_buffer": 8}"#).unwrap();
  assert_eq!(cfg.channel_buffer, 8);
  assert_eq!(cfg.alert_buffer, EngineConfig::default().alert_buffer);
}

#[test]
fn env_or_parses_and_falls_back() {
  // SAFETY: key is unique to this test.
  unsafe { std::env::set_var("CHAINWEAVE_TEST_ENV_OR_KEY", "42") };
  assert_eq!(crate::config::env_or("CHAINWEAVE_TEST_ENV_OR_KEY", 7_usize), 42);
  assert_eq!(crate::config::env_or("CHAINWEAVE_TEST_ENV_OR_MISSING", 7_usize), 7);
}

#[test]
fn backfill_follows_start_height() {
  assert!(!ClientConfig::default().backfill());
  let c = ClientConfig {
    start_height: Some(10),
    ..ClientConfig::default()
  };
  assert!(c.backfill());
}

#[test]
fn backtest_requires_range() {
  let cfg = PathConfig::new(Network::Layer1, TopicType::BlockHeader, PathType::Backtest);
  assert!(cfg.validate().is_err());
  let cfg = cfg.with_client(ClientConfig {
    start_height: Some(5),
    end_height: Some(9),
    ..ClientConfig::default()
  });
  assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_inverted_range() {
  let cfg = PathConfig::new(Network::Layer1, TopicType::BlockHeader, PathType::Live).with_client(
    ClientConfig {
      start_height: Some(9),
      end_height: Some(5),
      ..ClientConfig::default()
    },
  );
  assert!(cfg.validate().is_err());
}

#[test]
fn state_config_validates_hex() {
  let ok = PathStateConfig {
    addresses: vec![ADDR.to_string()],
    event_signatures: vec![SIG.to_string()],
  };
  assert!(ok.validate().is_ok());
  let bad = PathStateConfig {
    addresses: vec!["0x1234".to_string()],
    event_signatures: vec![],
  };
  assert!(bad.validate().is_err());
  let bad_sig = PathStateConfig {
    addresses: vec![],
    event_signatures: vec!["Transfer(address,address,uint256)".to_string()],
  };
  assert!(bad_sig.validate().is_err());
}

#[test]
fn path_config_deserializes_with_defaults() {
  let cfg: PathConfig =
    serde_json::from_str(r#"{"network":"layer2","path_type":"live","topic":"log"}"#).unwrap();
  assert_eq!(cfg.network, Network::Layer2);
  assert_eq!(cfg.topic, TopicType::Log);
  assert_eq!(cfg.client, ClientConfig::default());
  assert!(cfg.state.is_none());
}

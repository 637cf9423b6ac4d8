//! Classes of data flowing through the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Class of data a process emits or consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicType {
  BlockHeader,
  Log,
  AccountBalance,
}

impl TopicType {
  pub const ALL: [TopicType; 3] = [
    TopicType::BlockHeader,
    TopicType::Log,
    TopicType::AccountBalance,
  ];
}

impl fmt::Display for TopicType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TopicType::BlockHeader => write!(f, "block_header"),
      TopicType::Log => write!(f, "log"),
      TopicType::AccountBalance => write!(f, "account_balance"),
    }
  }
}

impl FromStr for TopicType {
  type Err = EngineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    TopicType::ALL
      .into_iter()
      .find(|t| t.to_string() == s.trim().to_lowercase())
      .ok_or_else(|| EngineError::Config(format!("unknown topic type: {}", s)))
  }
}

//! Chain network a path reads from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Chain network a path reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
  Layer1,
  Layer2,
}

impl fmt::Display for Network {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Network::Layer1 => write!(f, "layer1"),
      Network::Layer2 => write!(f, "layer2"),
    }
  }
}

impl FromStr for Network {
  type Err = EngineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "layer1" | "l1" => Ok(Network::Layer1),
      "layer2" | "l2" => Ok(Network::Layer2),
      other => Err(EngineError::Config(format!("unknown network: {}", other))),
    }
  }
}

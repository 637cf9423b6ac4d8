//! Execution mode of a path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Execution mode of a path. Backtest paths replay a bounded historical range
/// and are never shared between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathType {
  Live,
  Backtest,
}

impl fmt::Display for PathType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PathType::Live => write!(f, "live"),
      PathType::Backtest => write!(f, "backtest"),
    }
  }
}

impl FromStr for PathType {
  type Err = EngineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "live" => Ok(PathType::Live),
      "backtest" => Ok(PathType::Backtest),
      other => Err(EngineError::Config(format!("unknown path type: {}", other))),
    }
  }
}

//! Alerts emitted when a heuristic activates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PathId;

/// Identifier of a deployed heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeuristicId(pub Uuid);

impl HeuristicId {
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }
}

impl Default for HeuristicId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for HeuristicId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Alert severity, forwarded to the alert subsystem for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Low,
  Medium,
  High,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Low => write!(f, "low"),
      Severity::Medium => write!(f, "medium"),
      Severity::High => write!(f, "high"),
    }
  }
}

/// Fully formed alert handed to the alert subsystem.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
  pub severity: Severity,
  pub path_id: PathId,
  pub heuristic_id: HeuristicId,
  pub heuristic_name: String,
  pub timestamp: DateTime<Utc>,
  pub message: String,
}

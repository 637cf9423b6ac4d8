//! Key/value state store collaborator.
//!
//! Stateful processes read their working set (tracked addresses, event
//! signatures) from here. Implementations serialise access internally; the
//! engine takes no lock of its own around them.

mod memory;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::StateKey;

pub use memory::MemoryStateStore;

/// Ordered string lists keyed by [StateKey].
#[async_trait]
pub trait StateStore: Send + Sync {
  /// List stored under `key`; empty when absent.
  async fn get_slice(&self, key: &StateKey) -> Result<Vec<String>>;

  /// Appends `value` unless already present. Returns the list length.
  async fn set_slice(&self, key: &StateKey, value: &str) -> Result<usize>;

  async fn remove(&self, key: &StateKey) -> Result<()>;

  /// For a nesting key, maps every value to the list under its child key.
  async fn get_nested_subset(&self, key: &StateKey) -> Result<HashMap<String, Vec<String>>>;
}

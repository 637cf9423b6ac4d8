//! In-process state store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::StateStore;
use crate::error::{EngineError, Result};
use crate::types::StateKey;

/// State store held in memory behind one async read/write lock.
#[derive(Default)]
pub struct MemoryStateStore {
  slices: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryStateStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl StateStore for MemoryStateStore {
  async fn get_slice(&self, key: &StateKey) -> Result<Vec<String>> {
    Ok(
      self
        .slices
        .read()
        .await
        .get(&key.to_string())
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn set_slice(&self, key: &StateKey, value: &str) -> Result<usize> {
    let mut slices = self.slices.write().await;
    let entry = slices.entry(key.to_string()).or_default();
    if !entry.iter().any(|v| v == value) {
      entry.push(value.to_string());
    }
    Ok(entry.len())
  }

  async fn remove(&self, key: &StateKey) -> Result<()> {
    self.slices.write().await.remove(&key.to_string());
    Ok(())
  }

  async fn get_nested_subset(&self, key: &StateKey) -> Result<HashMap<String, Vec<String>>> {
    if !key.nesting {
      return Err(EngineError::State(format!("key {} is not a nesting key", key)));
    }
    let slices = self.slices.read().await;
    let parents = slices.get(&key.to_string()).cloned().unwrap_or_default();
    Ok(
      parents
        .into_iter()
        .map(|value| {
          let children = slices
            .get(&key.child(&value).to_string())
            .cloned()
            .unwrap_or_default();
          (value, children)
        })
        .collect(),
    )
  }
}

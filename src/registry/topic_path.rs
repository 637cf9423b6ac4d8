//! Dependency-resolved chain of topics.

use super::TopicSpec;
use crate::error::{EngineError, Result};
use crate::types::{Network, PathClass, PathType};

/// Ordered, inclusive chain of topics from a root reader to the requested
/// topic. Never empty.
#[derive(Debug, Clone)]
pub struct TopicPath {
  topics: Vec<TopicSpec>,
}

impl TopicPath {
  pub(crate) fn new(topics: Vec<TopicSpec>) -> Result<Self> {
    if topics.is_empty() {
      return Err(EngineError::EmptyPath);
    }
    Ok(Self { topics })
  }

  pub fn len(&self) -> usize {
    self.topics.len()
  }

  pub fn is_empty(&self) -> bool {
    self.topics.is_empty()
  }

  pub fn topics(&self) -> &[TopicSpec] {
    &self.topics
  }

  pub fn first(&self) -> &TopicSpec {
    &self.topics[0]
  }

  pub fn last(&self) -> &TopicSpec {
    &self.topics[self.topics.len() - 1]
  }

  /// Shape class of any path built from this chain.
  pub fn path_class(&self, path_type: PathType, network: Network) -> PathClass {
    PathClass::new(
      path_type,
      self.first().process_id(path_type, network),
      self.last().process_id(path_type, network),
    )
  }
}

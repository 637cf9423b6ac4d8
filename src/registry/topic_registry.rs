//! Registry of topic declarations.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument};

use super::{TopicPath, TopicSpec};
use crate::error::{EngineError, Result};
use crate::types::{ProcessKind, TopicType};

/// Validated map from topic to its declaration.
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
  specs: BTreeMap<TopicType, TopicSpec>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
  Visiting,
  Done,
}

impl TopicRegistry {
  /// Builds and validates a registry. Later specs replace earlier ones for
  /// the same topic.
  #[instrument(level = "trace", skip(specs))]
  pub fn new(specs: impl IntoIterator<Item = TopicSpec>) -> Result<Self> {
    let registry = Self {
      specs: specs.into_iter().map(|s| (s.topic, s)).collect(),
    };
    registry.validate()?;
    debug!(topics = registry.specs.len(), "topic registry loaded");
    Ok(registry)
  }

  /// Checks dependency shape and acyclicity.
  pub fn validate(&self) -> Result<()> {
    for spec in self.specs.values() {
      let expected = match spec.kind() {
        ProcessKind::Reader => 0,
        ProcessKind::Subscriber => 1,
      };
      if spec.dependencies.len() != expected {
        return Err(EngineError::Construction {
          topic: spec.topic,
          reason: format!(
            "{} topics take {} dependencies, found {}",
            spec.kind(),
            expected,
            spec.dependencies.len()
          ),
        });
      }
      if let Some(missing) = spec
        .dependencies
        .iter()
        .find(|d| !self.specs.contains_key(d))
      {
        return Err(EngineError::UnknownTopic(*missing));
      }
    }

    let mut marks: HashMap<TopicType, Mark> = HashMap::new();
    for topic in self.specs.keys() {
      self.visit(*topic, &mut marks)?;
    }
    Ok(())
  }

  fn visit(&self, topic: TopicType, marks: &mut HashMap<TopicType, Mark>) -> Result<()> {
    match marks.get(&topic) {
      Some(Mark::Done) => return Ok(()),
      Some(Mark::Visiting) => return Err(EngineError::DependencyCycle(topic)),
      None => {}
    }
    marks.insert(topic, Mark::Visiting);
    if let Some(spec) = self.specs.get(&topic) {
      for dep in &spec.dependencies {
        self.visit(*dep, marks)?;
      }
    }
    marks.insert(topic, Mark::Done);
    Ok(())
  }

  pub fn get(&self, topic: TopicType) -> Result<&TopicSpec> {
    self
      .specs
      .get(&topic)
      .ok_or(EngineError::UnknownTopic(topic))
  }

  pub fn topics(&self) -> impl Iterator<Item = TopicType> + '_ {
    self.specs.keys().copied()
  }

  /// Resolves the chain from the root reader to `topic`.
  #[instrument(level = "trace", skip(self))]
  pub fn topic_path(&self, topic: TopicType) -> Result<TopicPath> {
    let mut chain = vec![self.get(topic)?.clone()];
    while let Some(upstream) = chain[chain.len() - 1].dependencies.first().copied() {
      if chain.len() > self.specs.len() {
        return Err(EngineError::DependencyCycle(upstream));
      }
      chain.push(self.get(upstream)?.clone());
    }
    chain.reverse();
    TopicPath::new(chain)
  }
}

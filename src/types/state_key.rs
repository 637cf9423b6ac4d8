//! Keys into the external state store.

use std::fmt;

use super::{PathId, TopicType};

/// Key into the state store.
///
/// A nesting key holds a list whose values are themselves ids of child keys
/// (e.g. tracked addresses, each owning a list of event signatures).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
  pub nesting: bool,
  pub prefix: TopicType,
  pub id: String,
  /// Owning path. Unbound keys act as templates declared by a topic.
  pub path: Option<PathId>,
}

impl StateKey {
  pub fn new(nesting: bool, prefix: TopicType, id: impl Into<String>) -> Self {
    Self {
      nesting,
      prefix,
      id: id.into(),
      path: None,
    }
  }

  /// Binds a template to a path instance.
  pub fn bind(&self, path: PathId) -> Self {
    Self {
      path: Some(path),
      ..self.clone()
    }
  }

  /// Child key for one value of a nesting key.
  pub fn child(&self, value: &str) -> Self {
    Self {
      nesting: false,
      prefix: self.prefix,
      id: value.to_string(),
      path: self.path,
    }
  }
}

impl fmt::Display for StateKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.path {
      Some(path) => write!(f, "{}:{}:{}", self.prefix, self.id, path),
      None => write!(f, "{}:{}", self.prefix, self.id),
    }
  }
}

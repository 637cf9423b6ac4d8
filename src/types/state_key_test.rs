//! Tests for `StateKey`.

use uuid::Uuid;

use super::{
  Network, PathClass, PathId, PathType, ProcessId, ProcessKind, StateKey, TopicType,
};

fn path_id() -> PathId {
  let first = ProcessId::new(
    PathType::Live,
    ProcessKind::Reader,
    TopicType::BlockHeader,
    Network::Layer1,
  );
  PathId {
    class: PathClass::new(PathType::Live, first, first),
    instance: Uuid::nil(),
  }
}

#[test]
fn template_is_unbound() {
  let key = StateKey::new(true, TopicType::Log, "addresses");
  assert!(key.path.is_none());
  assert_eq!(key.to_string(), "log:addresses");
}

#[test]
fn bind_attaches_path_and_keeps_template() {
  let template = StateKey::new(true, TopicType::Log, "addresses");
  let bound = template.bind(path_id());
  assert_eq!(bound.path, Some(path_id()));
  assert!(bound.nesting);
  assert!(template.path.is_none());
  assert!(bound.to_string().starts_with("log:addresses:"));
}

#[test]
fn child_is_not_nesting_and_shares_path() {
  let bound = StateKey::new(true, TopicType::Log, "addresses").bind(path_id());
  let child = bound.child("0xabc");
  assert!(!child.nesting);
  assert_eq!(child.id, "0xabc");
  assert_eq!(child.path, bound.path);
}

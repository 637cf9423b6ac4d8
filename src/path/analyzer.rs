//! Reuse eligibility of paths.

use super::Path;
use crate::types::PathType;

/// Decides whether a requested path may be served by an existing one.
pub trait Analyzer: Send + Sync {
  fn mergeable(&self, a: &Path, b: &Path) -> bool;
}

/// [Analyzer] backed by [mergeable].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAnalyzer;

impl Analyzer for DefaultAnalyzer {
  fn mergeable(&self, a: &Path, b: &Path) -> bool {
    mergeable(a, b)
  }
}

/// True iff both paths have the same length, are live, do not backfill, and
/// share a class. Sufficient, not necessary: it says nothing about the
/// in-flight state of either path.
pub fn mergeable(a: &Path, b: &Path) -> bool {
  a.len() == b.len()
    && a.path_type() == PathType::Live
    && b.path_type() == PathType::Live
    && !a.backfill()
    && !b.backfill()
    && a.id().class == b.id().class
}

//! Input handed from a path's terminal process to the heuristic engine.

use super::{Event, PathId};

/// Output of a path's terminal process, tagged with the path that produced it.
#[derive(Debug, Clone)]
pub struct HeuristicInput {
  pub path_id: PathId,
  pub input: Event,
}

//! Heuristic engine: consumes relayed path output and evaluates the
//! heuristics deployed on it.

mod dispatch;
mod heuristic;
mod store;

pub use dispatch::HeuristicEngine;
pub use heuristic::{Activation, Deployment, Heuristic};
pub use store::HeuristicStore;

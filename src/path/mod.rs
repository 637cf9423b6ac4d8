//! Paths: concrete, runnable chains of processes, plus their store and the
//! reuse analyzer.

mod analyzer;
mod chain;
#[cfg(test)]
mod chain_test;
mod store;

pub use analyzer::{Analyzer, DefaultAnalyzer, mergeable};
pub use chain::Path;
pub use store::PathStore;

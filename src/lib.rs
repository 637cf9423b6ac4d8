//! # chainweave
//!
//! Blockchain ETL pipeline engine: topic declarations become chains of
//! reader and subscriber processes, wired by bounded channels, whose output
//! is relayed into a heuristic engine that raises alerts.
//!
//! ## Architecture
//!
//! Topic registry → processes → process graph → path → path store (with the
//! analyzer deciding reuse) → engine relay → heuristic engine → alerts.
//!
//! [Etl] is the entry point: [Etl::create_process_path], [Etl::run],
//! [Etl::shutdown].

pub mod client;
pub mod config;
pub mod config_io;
#[cfg(test)]
mod config_test;
pub mod engine;
pub mod error;
pub mod etl;
pub mod graph;
#[cfg(test)]
mod graph_test;
pub mod metrics;
#[cfg(test)]
mod metrics_test;
pub mod path;
pub mod process;
pub mod registry;
pub mod state;
pub mod testing;
pub mod types;

pub use config::{ClientConfig, EngineConfig, PathConfig, PathStateConfig};
pub use engine::{Activation, Heuristic, HeuristicEngine};
pub use error::{EngineError, Result};
pub use etl::{Etl, EtlOptions};
pub use graph::ProcessGraph;
pub use path::{Path, PathStore, mergeable};
pub use registry::{TopicRegistry, TopicSpec, default_registry};
pub use types::{Alert, Event, Network, PathId, PathType, Severity, TopicType};

//! Value types shared by every layer of the engine.
//!
//! Event payloads flow through the topology as `Arc<dyn Any + Send + Sync>`
//! inside an [Event].

mod alert;
mod chain_data;
mod event;
mod heuristic_input;
mod network;
mod path_activity;
mod path_id;
mod path_type;
mod process_id;
mod process_kind;
mod process_state;
mod state_key;
#[cfg(test)]
mod state_key_test;
mod topic_type;

pub use alert::{Alert, HeuristicId, Severity};
pub use chain_data::{AccountBalance, BlockHeader, ChainLog};
pub use event::Event;
pub use heuristic_input::HeuristicInput;
pub use network::Network;
pub use path_activity::{ActivityCell, PathActivity};
pub use path_id::{PathClass, PathId};
pub use path_type::PathType;
pub use process_id::{ProcessId, ProcessKey};
pub use process_kind::ProcessKind;
pub use process_state::ProcessState;
pub use state_key::StateKey;
pub use topic_type::TopicType;

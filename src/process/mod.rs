//! Processes: the runtime units of a path.
//!
//! A [Process] wraps either a [ReadDefinition] (originates events by polling a
//! chain) or a [TransformDefinition] (derives events from one upstream topic).
//! One task runs per process; processes talk only through bounded channels.
//!
//! Built-in definitions:
//! - [BlockTraversal]: walks block headers forward from a start height or the tip.
//! - [LogExtraction]: turns headers into logs of tracked addresses.
//! - [BalancePoller]: polls balances of tracked addresses.

mod balance_poller;
mod block_traversal;
mod definition;
mod log_extraction;
mod relay;
mod runtime;

pub use balance_poller::BalancePoller;
pub use block_traversal::BlockTraversal;
pub use definition::{FnTransform, ReadDefinition, TransformDefinition};
pub use log_extraction::LogExtraction;
pub use relay::EngineRelay;
pub use runtime::Process;

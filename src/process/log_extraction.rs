//! Subscriber deriving logs from block headers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, trace};

use super::TransformDefinition;
use crate::client::ChainClient;
use crate::error::Result;
use crate::state::StateStore;
use crate::types::{BlockHeader, ChainLog, Event, StateKey, TopicType};

/// For each header, fetches the logs of every tracked address.
///
/// Tracked addresses live under a nesting state key; each address may list
/// event signatures under its child key, in which case only logs whose first
/// topic matches are kept.
pub struct LogExtraction {
  client: Arc<dyn ChainClient>,
  state: Arc<dyn StateStore>,
  key: StateKey,
}

impl LogExtraction {
  pub fn new(client: Arc<dyn ChainClient>, state: Arc<dyn StateStore>, key: StateKey) -> Self {
    Self { client, state, key }
  }
}

fn matches_signatures(log: &ChainLog, signatures: &[String]) -> bool {
  signatures.is_empty()
    || log
      .signature()
      .is_some_and(|sig| signatures.iter().any(|s| s.eq_ignore_ascii_case(sig)))
}

#[async_trait]
impl TransformDefinition for LogExtraction {
  #[instrument(level = "trace", skip(self, event), fields(key = %self.key))]
  async fn transform(&mut self, event: Event) -> Result<Vec<Event>> {
    let header = event.value::<BlockHeader>()?;
    let tracked = self.state.get_nested_subset(&self.key).await?;
    if tracked.is_empty() {
      return Ok(vec![]);
    }
    let mut addresses: Vec<String> = tracked.keys().cloned().collect();
    addresses.sort();

    let logs = self.client.logs(header.number, &addresses).await?;
    let out: Vec<Event> = logs
      .into_iter()
      .filter(|log| {
        tracked
          .iter()
          .find(|(addr, _)| addr.eq_ignore_ascii_case(&log.address))
          .is_some_and(|(_, sigs)| matches_signatures(log, sigs))
      })
      .map(|log| event.derive(TopicType::Log, log))
      .collect();
    trace!(block = header.number, count = out.len(), "extracted logs");
    Ok(out)
  }
}

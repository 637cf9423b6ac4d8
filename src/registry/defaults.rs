//! Built-in topics.

use super::{BuildContext, Constructor, TopicRegistry, TopicSpec};
use crate::error::{EngineError, Result};
use crate::process::{BalancePoller, BlockTraversal, LogExtraction};
use crate::types::{StateKey, TopicType};

fn bound_key(ctx: &BuildContext<'_>) -> Result<StateKey> {
  ctx.state_key.clone().ok_or(EngineError::Construction {
    topic: ctx.process_id.topic,
    reason: "stateful topic built without a state key".to_string(),
  })
}

/// `BlockHeader` reader, `Log` subscriber on headers, `AccountBalance` reader.
pub fn default_registry() -> Result<TopicRegistry> {
  TopicRegistry::new([
    TopicSpec::reader(
      TopicType::BlockHeader,
      Constructor::reader(|ctx| {
        Ok(Box::new(BlockTraversal::new(
          ctx.network,
          ctx.clients.get(ctx.network)?,
          ctx.client_config,
          ctx.engine_config.max_backfill_batch,
        )))
      }),
    ),
    TopicSpec::subscriber(
      TopicType::Log,
      TopicType::BlockHeader,
      Constructor::subscriber(|ctx| {
        Ok(Box::new(LogExtraction::new(
          ctx.clients.get(ctx.network)?,
          ctx.state.clone(),
          bound_key(ctx)?,
        )))
      }),
    )
    .with_state_key(StateKey::new(true, TopicType::Log, "addresses")),
    TopicSpec::reader(
      TopicType::AccountBalance,
      Constructor::reader(|ctx| {
        Ok(Box::new(BalancePoller::new(
          ctx.network,
          ctx.clients.get(ctx.network)?,
          ctx.state.clone(),
          bound_key(ctx)?,
        )))
      }),
    )
    .with_state_key(StateKey::new(false, TopicType::AccountBalance, "addresses")),
  ])
}

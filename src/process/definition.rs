//! Per-topic logic plugged into a process.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Event;

/// Logic of a reader: one poll or traversal step of an external source.
#[async_trait]
pub trait ReadDefinition: Send {
  /// Runs one step and returns the events it originated, in order.
  ///
  /// Transient source failures should be handled here; an `Err` is fatal and
  /// ends the reader.
  async fn read(&mut self) -> Result<Vec<Event>>;

  /// Chain height reached so far, for height-aware readers.
  fn height(&self) -> Option<u64> {
    None
  }

  /// True once a bounded range has been fully read.
  fn finished(&self) -> bool {
    false
  }
}

/// Logic of a subscriber: derives zero or more events from one upstream event.
#[async_trait]
pub trait TransformDefinition: Send {
  /// An `Err` drops this item only; the subscriber keeps running.
  async fn transform(&mut self, event: Event) -> Result<Vec<Event>>;
}

/// Transform backed by a plain function.
pub struct FnTransform<F>(pub F);

impl<F> FnTransform<F>
where
  F: FnMut(Event) -> Result<Vec<Event>> + Send,
{
  pub fn new(f: F) -> Self {
    Self(f)
  }
}

#[async_trait]
impl<F> TransformDefinition for FnTransform<F>
where
  F: FnMut(Event) -> Result<Vec<Event>> + Send,
{
  async fn transform(&mut self, event: Event) -> Result<Vec<Event>> {
    (self.0)(event)
  }
}

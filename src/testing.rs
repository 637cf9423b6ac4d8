//! Definitions for driving processes by hand in tests and demos.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{EngineError, Result};
use crate::process::ReadDefinition;
use crate::types::{BlockHeader, Event};

/// Reader whose driving step waits on a channel: each event sent on the
/// paired sender is originated once. Finishes when every sender is dropped.
pub struct ChannelReader {
  rx: mpsc::Receiver<Event>,
  closed: bool,
  height: Option<u64>,
}

/// Creates a [ChannelReader] and the sender that feeds it.
pub fn channel_reader(buffer: usize) -> (mpsc::Sender<Event>, ChannelReader) {
  let (tx, rx) = mpsc::channel(buffer.max(1));
  (
    tx,
    ChannelReader {
      rx,
      closed: false,
      height: None,
    },
  )
}

#[async_trait]
impl ReadDefinition for ChannelReader {
  async fn read(&mut self) -> Result<Vec<Event>> {
    match self.rx.recv().await {
      Some(event) => {
        if let Ok(header) = event.value::<BlockHeader>() {
          self.height = Some(header.number);
        }
        Ok(vec![event])
      }
      None => {
        self.closed = true;
        Ok(vec![])
      }
    }
  }

  fn height(&self) -> Option<u64> {
    self.height
  }

  fn finished(&self) -> bool {
    self.closed
  }
}

/// Reader that fails on its first step.
pub struct FailingReader(pub String);

#[async_trait]
impl ReadDefinition for FailingReader {
  async fn read(&mut self) -> Result<Vec<Event>> {
    Err(EngineError::Client(self.0.clone()))
  }
}

/// Polls `cond` every few milliseconds until it holds or `within` elapses.
/// Returns whether it held.
pub async fn wait_for(within: std::time::Duration, mut cond: impl FnMut() -> bool) -> bool {
  let deadline = tokio::time::Instant::now() + within;
  loop {
    if cond() {
      return true;
    }
    if tokio::time::Instant::now() >= deadline {
      return false;
    }
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  }
}

//! End-to-end scenarios through the public API: path construction, reuse,
//! backfill isolation and engine relay.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chainweave::client::{ChainClients, StaticChainClient};
use chainweave::config::ClientConfig;
use chainweave::process::{EngineRelay, FnTransform, Process};
use chainweave::registry::Constructor;
use chainweave::testing::{ChannelReader, channel_reader};
use chainweave::types::{
  BlockHeader, PathClass, PathId, ProcessId, ProcessKey, ProcessKind,
};
use chainweave::{
  EngineError, Etl, EtlOptions, Event, Network, Path, PathConfig, PathType, TopicRegistry,
  TopicSpec, TopicType, default_registry, mergeable, metrics,
};
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

fn header_event(n: u64) -> Event {
  Event::new(
    Network::Layer1,
    TopicType::BlockHeader,
    BlockHeader {
      number: n,
      hash: format!("0x{:064x}", n + 1),
      parent_hash: format!("0x{:064x}", n),
      timestamp: 1_700_000_000 + n,
    },
  )
}

/// Registry whose root reader is fed by hand and whose derived topic maps
/// each header to its number.
fn hand_fed_registry(reader: ChannelReader) -> TopicRegistry {
  let slot = Arc::new(Mutex::new(Some(reader)));
  TopicRegistry::new([
    TopicSpec::reader(
      TopicType::BlockHeader,
      Constructor::reader(move |ctx| {
        let reader = slot.lock().unwrap().take().ok_or(EngineError::Construction {
          topic: ctx.process_id.topic,
          reason: "reader already taken".to_string(),
        })?;
        Ok(Box::new(reader))
      }),
    ),
    TopicSpec::subscriber(
      TopicType::Log,
      TopicType::BlockHeader,
      Constructor::subscriber(|_| {
        Ok(Box::new(FnTransform::new(|ev: Event| {
          let number = ev.value::<BlockHeader>()?.number;
          Ok(vec![ev.derive(TopicType::Log, number)])
        })))
      }),
    ),
  ])
  .unwrap()
}

fn live(topic: TopicType) -> PathConfig {
  PathConfig::new(Network::Layer1, topic, PathType::Live).with_client(ClientConfig {
    poll_interval_ms: Some(5),
    ..ClientConfig::default()
  })
}

fn static_etl() -> Etl {
  Etl::new(
    default_registry().unwrap(),
    ChainClients::new().with(Network::Layer1, Arc::new(StaticChainClient::new())),
    EtlOptions::default(),
  )
  .unwrap()
}

#[test]
fn path_class_is_a_pure_function_of_the_request() {
  let registry = default_registry().unwrap();
  for topic in TopicType::ALL {
    let chain = registry.topic_path(topic).unwrap();
    let a = chain.path_class(PathType::Live, Network::Layer2);
    let b = registry
      .topic_path(topic)
      .unwrap()
      .path_class(PathType::Live, Network::Layer2);
    assert_eq!(a, b);
    assert_ne!(a, chain.path_class(PathType::Backtest, Network::Layer2));
    assert_ne!(a, chain.path_class(PathType::Live, Network::Layer1));
  }
}

#[tokio::test]
async fn two_hop_path_delivers_one_transformed_unit() {
  let (feed, reader) = channel_reader(4);
  let mut etl = Etl::new(
    hand_fed_registry(reader),
    ChainClients::new(),
    EtlOptions::default(),
  )
  .unwrap();
  let (id, reused) = etl.create_process_path(live(TopicType::Log)).await.unwrap();
  assert!(!reused);

  let path = etl.store().get_path_by_id(&id).unwrap();
  assert_eq!(path.len(), 2);
  let (probe_tx, mut probe) = mpsc::channel(4);
  let probe_key = ProcessKey::new(
    ProcessId::new(
      PathType::Live,
      ProcessKind::Subscriber,
      TopicType::Log,
      Network::Layer1,
    ),
    Uuid::new_v4(),
  );
  path.terminal().add_subscriber(probe_key, probe_tx).unwrap();

  etl.run(id).unwrap();
  let sent = header_event(7);
  let produced_at = sent.timestamp;
  feed.send(sent).await.unwrap();

  let out = tokio::time::timeout(Duration::from_secs(2), probe.recv())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(out.topic, TopicType::Log);
  assert_eq!(*out.value::<u64>().unwrap(), 7);
  assert_eq!(out.timestamp, produced_at);
  tokio::time::sleep(Duration::from_millis(50)).await;
  assert!(probe.try_recv().is_err());

  etl.shutdown().await.unwrap();
}

#[tokio::test]
async fn identical_live_request_reuses_the_path() {
  let mut etl = static_etl();
  let (first, reused) = etl
    .create_process_path(live(TopicType::BlockHeader))
    .await
    .unwrap();
  assert!(!reused);
  let (second, reused) = etl
    .create_process_path(live(TopicType::BlockHeader))
    .await
    .unwrap();
  assert!(reused);
  assert_eq!(first, second);
}

#[tokio::test]
async fn backfilling_path_is_not_merged() {
  let mut etl = static_etl();
  let backfill = live(TopicType::BlockHeader).with_client(ClientConfig {
    start_height: Some(0),
    poll_interval_ms: Some(5),
    ..ClientConfig::default()
  });
  let (first, _) = etl.create_process_path(backfill).await.unwrap();
  let (second, reused) = etl
    .create_process_path(live(TopicType::BlockHeader))
    .await
    .unwrap();
  assert!(!reused);
  assert_ne!(first, second);
  assert_eq!(first.class, second.class);

  let a = etl.store().get_path_by_id(&first).unwrap();
  let b = etl.store().get_path_by_id(&second).unwrap();
  assert!(!mergeable(&a, &b));
  assert!(!mergeable(&b, &a));
  assert_eq!(etl.store().len(), 2);
}

#[tokio::test]
async fn relay_tags_output_with_the_path_id() {
  let root = ProcessId::new(
    PathType::Live,
    ProcessKind::Reader,
    TopicType::BlockHeader,
    Network::Layer1,
  );
  let id = PathId::new(PathClass::new(PathType::Live, root, root));
  let (feed, reader) = channel_reader(1);
  let process = Arc::new(Process::reader(
    root,
    id,
    Box::new(reader),
    Duration::from_millis(1),
    metrics::noop(),
  ));
  let path = Path::new(id, live(TopicType::BlockHeader), vec![process]).unwrap();
  let (ingress, mut engine) = mpsc::channel(4);
  path
    .add_engine_relay(EngineRelay::new(id, ingress, metrics::noop()))
    .unwrap();

  let tracker = TaskTracker::new();
  path.run(&tracker).unwrap();
  let sent = header_event(1);
  feed.send(sent.clone()).await.unwrap();

  let input = tokio::time::timeout(Duration::from_secs(2), engine.recv())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(input.path_id, id);
  assert!(input.input.same_payload(&sent));

  path.close().unwrap();
  tracker.close();
  tracker.wait().await;
}

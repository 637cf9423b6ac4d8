//! CLI: run ETL paths against an in-memory chain that mines a block every tick.
//!
//! Usage: `etl_demo [OPTIONS]`
//! Example: etl_demo --paths paths.json --every 5 --duration-secs 10
//!
//! Without `--paths` a single live `block_header` path on layer1 is built.
//! A demo heuristic alerts on every block whose number is a multiple of `--every`.
//!
//! Set RUST_LOG=chainweave=trace for TRACE-level span enter/exit and events.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chainweave::client::{ChainClients, StaticChainClient};
use chainweave::config_io::{load_engine_config, load_path_configs};
use chainweave::types::{BlockHeader, HeuristicInput};
use chainweave::{
  Activation, EngineConfig, Etl, EtlOptions, Heuristic, Network, PathConfig, PathType, Severity,
  TopicType, default_registry,
};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Run ETL paths against an in-memory chain.
#[derive(Parser, Debug)]
#[command(name = "etl_demo")]
#[command(
  after_help = r#"Environment variables (used when --config is not given):
  CHAINWEAVE_CHANNEL_BUFFER, CHAINWEAVE_ENGINE_INGRESS_BUFFER, CHAINWEAVE_ALERT_BUFFER,
  CHAINWEAVE_POLL_INTERVAL_MS, CHAINWEAVE_MAX_BACKFILL_BATCH

Examples:
  etl_demo
  etl_demo --paths paths.json --every 3 --duration-secs 5"#
)]
struct Args {
  /// Engine configuration JSON file. Defaults to CHAINWEAVE_* environment variables.
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// JSON array of path requests.
  #[arg(long, value_name = "FILE")]
  paths: Option<PathBuf>,

  /// Alert on block numbers divisible by this value.
  #[arg(long, default_value_t = 5)]
  every: u64,

  /// Milliseconds between mined blocks.
  #[arg(long, default_value_t = 200)]
  block_time_ms: u64,

  /// Stop after this many seconds (Ctrl-C stops earlier).
  #[arg(long, default_value_t = 10)]
  duration_secs: u64,
}

/// Fires on every `n`th block.
struct BlockMultiple(u64);

#[async_trait]
impl Heuristic for BlockMultiple {
  fn name(&self) -> &str {
    "block_multiple"
  }

  fn input_topic(&self) -> TopicType {
    TopicType::BlockHeader
  }

  async fn assess(&self, input: &HeuristicInput) -> chainweave::Result<Option<Activation>> {
    let header = input.input.value::<BlockHeader>()?;
    Ok(
      (header.number % self.0 == 0)
        .then(|| Activation::new(format!("block {} is a multiple of {}", header.number, self.0))),
    )
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_ansi(std::io::stdout().is_terminal())
    .init();

  info!("etl_demo starting");
  let args = Args::parse();
  if let Err(e) = run(args).await {
    eprintln!("Error: {}", e);
    process::exit(1);
  }
}

async fn run(args: Args) -> chainweave::Result<()> {
  let config = match &args.config {
    Some(path) => load_engine_config(path)?,
    None => EngineConfig::from_env(),
  };
  let requests = match &args.paths {
    Some(path) => load_path_configs(path)?,
    None => vec![PathConfig::new(
      Network::Layer1,
      TopicType::BlockHeader,
      PathType::Live,
    )],
  };

  let chain = Arc::new(StaticChainClient::new());
  chain.mine(1).await;
  let clients = ChainClients::new()
    .with(Network::Layer1, chain.clone())
    .with(Network::Layer2, chain.clone());
  let mut etl = Etl::new(
    default_registry()?,
    clients,
    EtlOptions {
      config,
      ..EtlOptions::default()
    },
  )?;

  let mut alerts = etl
    .take_alerts()
    .ok_or_else(|| chainweave::EngineError::ChannelClosed("alert receiver".to_string()))?;
  tokio::spawn(async move {
    while let Some(alert) = alerts.recv().await {
      warn!(
        severity = %alert.severity,
        path_id = %alert.path_id,
        heuristic = %alert.heuristic_name,
        message = %alert.message,
        "alert"
      );
    }
  });

  let heuristic = Arc::new(BlockMultiple(args.every.max(1)));
  for request in requests {
    let topic = request.topic;
    let (id, reused) = etl.create_process_path(request).await?;
    info!(path_id = %id, reused, "path ready");
    if topic == TopicType::BlockHeader {
      etl.deploy_heuristic(id, heuristic.clone(), Severity::Medium)?;
    }
    if !reused {
      etl.run(id)?;
    }
  }
  info!(active = etl.active_count(), "paths running");

  let miner = {
    let chain = chain.clone();
    let block_time = Duration::from_millis(args.block_time_ms.max(1));
    tokio::spawn(async move {
      let mut ticker = tokio::time::interval(block_time);
      loop {
        ticker.tick().await;
        chain.mine(1).await;
      }
    })
  };

  tokio::select! {
    _ = tokio::time::sleep(Duration::from_secs(args.duration_secs)) => {}
    _ = tokio::signal::ctrl_c() => info!("interrupted"),
  }
  miner.abort();

  for path in etl.store().paths() {
    match etl.block_height(path.id()) {
      Ok(height) => info!(path_id = %path.id(), height, activity = %path.activity(), "path status"),
      Err(_) => info!(path_id = %path.id(), activity = %path.activity(), "path status"),
    }
  }

  let result = etl.shutdown().await;
  if let Err(e) = &result {
    error!(error = %e, "shutdown incomplete");
  }
  result
}

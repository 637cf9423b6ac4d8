//! Load engine and path configuration from JSON files.

use std::path::Path;

use tracing::instrument;

use crate::config::{EngineConfig, PathConfig};
use crate::error::Result;

/// Loads an [EngineConfig] from `path`. Missing fields take their defaults.
#[instrument(level = "trace", skip(path))]
pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
  let bytes = std::fs::read(path)?;
  let cfg: EngineConfig = serde_json::from_slice(&bytes)?;
  cfg.validate()?;
  Ok(cfg)
}

/// Loads a JSON array of [PathConfig] from `path`, validating each entry.
#[instrument(level = "trace", skip(path))]
pub fn load_path_configs(path: &Path) -> Result<Vec<PathConfig>> {
  let bytes = std::fs::read(path)?;
  let cfgs: Vec<PathConfig> = serde_json::from_slice(&bytes)?;
  for cfg in &cfgs {
    cfg.validate()?;
  }
  Ok(cfgs)
}

/// Writes path configs to `path` as pretty JSON, creating parent directories.
#[instrument(level = "trace", skip(path, cfgs))]
pub fn save_path_configs(path: &Path, cfgs: &[PathConfig]) -> Result<()> {
  let json = serde_json::to_string_pretty(cfgs)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}

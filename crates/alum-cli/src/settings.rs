//! Client configuration: defaults, then the TOML file, then `ALUM_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Resolved locations of everything the local platform keeps on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  pub store_path:     PathBuf,
  pub allowlist_path: PathBuf,
  pub blob_dir:       PathBuf,
  pub log_file:       PathBuf,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      store_path:     PathBuf::from("~/.local/share/alum/alum.db"),
      allowlist_path: PathBuf::from("~/.config/alum/allowlist.txt"),
      blob_dir:       PathBuf::from("~/.local/share/alum/blobs"),
      log_file:       PathBuf::from("~/.local/state/alum/alum.log"),
    }
  }
}

/// Values given on the command line; each one wins over the file and
/// environment.
#[derive(Debug, Default)]
pub struct Overrides {
  pub store:     Option<PathBuf>,
  pub allowlist: Option<PathBuf>,
  pub blob_dir:  Option<PathBuf>,
  pub log_file:  Option<PathBuf>,
}

impl ClientConfig {
  /// Layer the config file (optional) and environment, apply `overrides`,
  /// then expand `~` in every path.
  pub fn load(file: &Path, overrides: Overrides) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("ALUM"))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let mut cfg: ClientConfig = settings
      .try_deserialize()
      .context("failed to deserialise ClientConfig")?;

    if let Some(path) = overrides.store {
      cfg.store_path = path;
    }
    if let Some(path) = overrides.allowlist {
      cfg.allowlist_path = path;
    }
    if let Some(path) = overrides.blob_dir {
      cfg.blob_dir = path;
    }
    if let Some(path) = overrides.log_file {
      cfg.log_file = path;
    }

    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.allowlist_path = expand_tilde(&cfg.allowlist_path);
    cfg.blob_dir = expand_tilde(&cfg.blob_dir);
    cfg.log_file = expand_tilde(&cfg.log_file);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

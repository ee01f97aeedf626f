//! Runtime settings: an optional TOML file layered under `RIVAL_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use rival_api::SearchOptions;
use rival_core::nemesis::MatchPolicy;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub store_path:          PathBuf,
  pub host:                String,
  pub port:                u16,
  pub search_timeout_secs: u64,
  pub match_policy:        MatchPolicy,
}

impl Settings {
  /// Read `file` (if it exists), then the environment, over the defaults.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .set_default("store_path", "rival.sqlite")?
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8686)?
      .set_default("search_timeout_secs", 30)?
      .set_default("match_policy", "per_metric")?
      .add_source(config::File::from(file.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("RIVAL"))
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn search_options(&self) -> SearchOptions {
    SearchOptions {
      policy:  self.match_policy,
      timeout: Duration::from_secs(self.search_timeout_secs),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let settings = Settings::load(Path::new("does-not-exist.toml")).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("rival.sqlite"));
    assert_eq!(settings.port, 8686);
    assert_eq!(settings.match_policy, MatchPolicy::PerMetric);
    assert_eq!(settings.search_options().timeout, Duration::from_secs(30));
  }

  #[test]
  fn file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("rival.toml");
    std::fs::write(&file, "port = 9000\nmatch_policy = \"require_both\"\n").unwrap();

    let settings = Settings::load(&file).unwrap();
    assert_eq!(settings.port, 9000);
    assert_eq!(settings.match_policy, MatchPolicy::RequireBoth);
    assert_eq!(settings.address(), "127.0.0.1:9000");
  }
}

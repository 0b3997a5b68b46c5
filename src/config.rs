//! Service configuration from environment variables (prefix `LITHIUM_`),
//! with `.env` support via dotenvy at startup.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Where the prior-day baseline lives
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// When set, snapshots are fetched from this URL instead of the
    /// hardcoded constants
    #[serde(default)]
    pub quote_url: Option<String>,

    #[serde(default)]
    pub quote_timeout_secs: Option<u64>,
}

fn default_port() -> u16 {
    8080
}

fn default_history_path() -> PathBuf {
    PathBuf::from("history.json")
}

impl ServiceConfig {
    /// Load from LITHIUM_* environment variables, falling back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("LITHIUM").try_parsing(true))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}

use std::collections::HashMap;

use common::RoundPolicy;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub use common::config::ExecutorConfig;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Postgres URL. When absent the server keeps state in memory.
    #[serde(default)]
    pub url: Option<String>,
}

/// Plagiarism scan settings.
#[derive(Debug, Deserialize, Clone)]
pub struct AntiCheatConfig {
    /// Submissions pulled per scan. Default: 200.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Minimum similarity that raises a flag. Default: 0.92.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Seconds between background scans; 0 disables them. Default: 0.
    #[serde(default)]
    pub scan_interval_secs: u64,
}

fn default_recent_limit() -> usize {
    200
}
fn default_threshold() -> f64 {
    common::similarity::DEFAULT_THRESHOLD
}

impl Default for AntiCheatConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            threshold: default_threshold(),
            scan_interval_secs: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub anti_cheat: AntiCheatConfig,
    /// Judging policy keyed by round id.
    #[serde(default)]
    pub rounds: HashMap<String, RoundPolicy>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONTEST_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        Self::from_builder(
            Config::builder()
                // Load from config/config.toml
                .add_source(File::with_name(&config_path).required(false))
                // Override from environment (e.g., CONTEST__EXECUTOR__URL)
                .add_source(
                    Environment::with_prefix("CONTEST")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::from_builder(Config::builder().add_source(File::from_str(source, FileFormat::Toml)))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("executor.timeout_ms", 20_000_i64)?
            .set_default("anti_cheat.recent_limit", 200_i64)?
            .build()?
            .try_deserialize()
    }
}

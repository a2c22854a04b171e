// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::alerts::AlertConfig;
use crate::session::SessionConfig;
use crate::tracker::TrackerConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub tracker: TrackerConfig,
    pub alerts: AlertConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path))?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Directory scanned (recursively) for *.jsonl detection logs
    pub input_dir: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

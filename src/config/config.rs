use crate::sequence_processor::readers::{DEFAULT_BLOCK_SIZE, DEFAULT_MAX_LINE_LENGTH};
use crate::sequence_processor::threading::DEFAULT_BATCH_SIZE;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::thread;

/// Defaults read from `config.toml` in the user's config directory. Command-line flags take
/// precedence over every value here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: None,
            block_size: default_block_size(),
            batch_size: default_batch_size(),
            max_line_length: default_max_line_length(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("org", "fastx-toolkit", "fastx-qual-stats") {
            let config_path = proj_dirs.config_dir().join("config.toml");

            if config_path.exists() {
                match Self::load_from(&config_path) {
                    Ok(config) => {
                        debug!("Loaded configuration from {}", config_path.display());
                        return config;
                    }
                    Err(e) => warn!("Ignoring configuration file: {:#}", e),
                }
            }
        }
        Config::default()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Configured worker count, or the number of available CPUs.
    pub fn threads(&self) -> usize {
        self.threads
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()))
    }
}

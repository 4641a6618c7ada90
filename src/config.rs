use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::signer::hardware::LEDGER_LIVE_TEMPLATE;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".scui.toml";

/// Accounts shown per page when choosing a hardware wallet account
pub const DEFAULT_ADDRESS_BATCH: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse TOML config from {path}: {reason}")]
    Parse { path: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub signer: SignerConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SignerConfig {
    /// Derivation path template offered first, `x` marks the account index
    #[serde(default)]
    pub derivation_path: Option<String>,
    /// Accounts listed per page during account selection
    #[serde(default)]
    pub address_batch: Option<u32>,
}

impl SignerConfig {
    pub fn derivation_path(&self) -> &str {
        self.derivation_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(LEDGER_LIVE_TEMPLATE)
    }

    pub fn address_batch(&self) -> u32 {
        self.address_batch
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_ADDRESS_BATCH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConsoleConfig {
    /// Force colored output on or off
    #[serde(default)]
    pub color: Option<bool>,
}

impl Config {
    /// Candidate config files, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("scui").join("config.toml"));
        }
        paths
    }

    /// Load the first config file that exists, or defaults when there is none
    pub fn load() -> Result<Self, ConfigError> {
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config");
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load default config if file is missing or broken
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config: {}. Using defaults.", e);
                Config::default()
            }
        }
    }
}

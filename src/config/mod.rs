//! Configuration file

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::{TokenCache, CALLBACK_TIMEOUT};

/// Application configuration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the OAuth client secrets JSON downloaded from the API console
    pub client_secrets: Option<PathBuf>,
    /// Override for the token cache directory
    pub cache_dir: Option<PathBuf>,
    /// Seconds to wait for the authorization redirect
    pub callback_timeout_secs: Option<u64>,
    /// Fixed loopback port for the authorization redirect
    pub callback_port: Option<u16>,
    /// Override for the YouTube Data API base URL
    pub api_base: Option<String>,
}

impl Config {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "youtube-cli", "youtube-cli")
            .context("Could not determine config directory")
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Client secrets path, with the default next to the config file
    pub fn client_secrets_path(&self) -> Result<PathBuf> {
        match &self.client_secrets {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.config_dir().join("client_secret.json")),
        }
    }

    pub fn token_cache(&self) -> Result<TokenCache> {
        match &self.cache_dir {
            Some(dir) => Ok(TokenCache::new(dir)),
            None => TokenCache::platform(),
        }
    }

    pub fn callback_timeout(&self) -> Duration {
        self.callback_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(CALLBACK_TIMEOUT)
    }

    /// Redirect port, 0 letting the OS pick one
    pub fn callback_port(&self) -> u16 {
        self.callback_port.unwrap_or(0)
    }
}

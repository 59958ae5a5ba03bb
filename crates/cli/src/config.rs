// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.tether/config.toml` and includes:
//! - `[remote]`: base URL, bearer token and timeouts for the REST service
//! - `[sync]`: retry limit and connectivity probe cadence
//! - `[entities.<name>]`: collection path and enabled operations per entity type

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tether_core::{EndpointDescriptor, EntityRegistry, OpKind};

use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".tether";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "store.db";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Environment variable that overrides `[remote].token`.
pub const TOKEN_ENV: &str = "TETHER_TOKEN";

/// Project configuration stored in `.tether/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote service. Without it every call takes the offline path.
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub sync: SyncSettings,
    /// Entity types. Empty means the stock `document` and `category` types.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entities: BTreeMap<String, EntityConfig>,
}

/// Remote REST service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL, e.g. `https://api.example.com`.
    pub url: String,
    /// Bearer credential sent with every call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Reachability probe path (default: "/api/health").
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Per-call timeout in milliseconds (default: 10000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            token: None,
            health_path: default_health_path(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Validates that the URL is an http(s) URL.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        match reqwest::Url::parse(&self.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => None,
            Ok(url) => Some(format!(
                "invalid remote URL '{}': unsupported scheme '{}'",
                self.url,
                url.scheme()
            )),
            Err(e) => Some(format!("invalid remote URL '{}': {}", self.url, e)),
        }
    }

    /// The token to send, with `TETHER_TOKEN` taking precedence.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_health_path() -> String {
    "/api/health".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Drain and probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Failed sends before an op is escalated (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Connectivity probe interval in milliseconds (default: 5000).
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    /// Delay before the first drain in watch mode (default: 2000).
    #[serde(default = "default_initial_sync_delay_ms")]
    pub initial_sync_delay_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            max_attempts: default_max_attempts(),
            probe_interval_ms: default_probe_interval_ms(),
            initial_sync_delay_ms: default_initial_sync_delay_ms(),
        }
    }
}

impl SyncSettings {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn initial_sync_delay(&self) -> Duration {
        Duration::from_millis(self.initial_sync_delay_ms)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_probe_interval_ms() -> u64 {
    5_000
}

fn default_initial_sync_delay_ms() -> u64 {
    2_000
}

/// One `[entities.<name>]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Collection path on the remote service, e.g. `/api/documents`.
    pub path: String,
    /// Enabled operations (default: all).
    #[serde(default = "default_operations")]
    pub operations: Vec<OpKind>,
}

fn default_operations() -> Vec<OpKind> {
    OpKind::ALL.to_vec()
}

impl Config {
    /// Creates a config pointing at `url`, or a local-only config.
    pub fn new(remote_url: Option<&str>) -> Result<Self> {
        let remote = remote_url.map(RemoteConfig::new);
        if let Some(message) = remote.as_ref().and_then(RemoteConfig::validate_url) {
            return Err(Error::Config(message));
        }
        Ok(Config {
            remote,
            ..Config::default()
        })
    }

    /// Loads configuration from the given `.tether/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        if config.sync.max_attempts == 0 {
            return Err(Error::Config("sync.max_attempts must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Saves configuration to the given `.tether/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Returns the remote URL if configured.
    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.url.as_str())
    }

    /// Builds and validates the entity registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntity`] for a malformed `[entities]` table.
    pub fn registry(&self) -> Result<EntityRegistry> {
        if self.entities.is_empty() {
            return Ok(EntityRegistry::with_defaults());
        }
        let mut registry = EntityRegistry::new();
        for (name, entity) in &self.entities {
            let descriptor = EndpointDescriptor::new(entity.path.clone())
                .with_operations(entity.operations.clone());
            registry.register(name, descriptor)?;
        }
        Ok(registry)
    }
}

/// Find the .tether directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Get the store database path
pub fn get_db_path(work_dir: &Path) -> PathBuf {
    work_dir.join(DB_FILE_NAME)
}

/// Initialize a new .tether directory at the given path
pub fn init_work_dir(path: &Path, remote_url: Option<&str>) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    let config = Config::new(remote_url)?;
    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Keeps the store out of version control; the config may be shared.
fn write_gitignore(work_dir: &Path) -> Result<()> {
    let content = "# Local store (records and pending operations)\nstore.db\nstore.db-wal\nstore.db-shm\n";
    fs::write(work_dir.join(GITIGNORE_FILE_NAME), content)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

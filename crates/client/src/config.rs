// CodeViz - Algorithm Playground Core
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Configuration system for the CodeViz client
//!
//! Settings live in `~/.codeviz.toml` (or the file named by
//! `CODEVIZ_CONFIG`). Every section is optional; missing keys fall back to
//! their defaults.

use codeviz_common::env::{CODEVIZ_CONFIG, CODEVIZ_ENDPOINT, CODEVIZ_TERMINAL_URL};
use codeviz_engine::DEFAULT_HORIZON;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

use crate::socket::ReconnectPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Execution service endpoints
    pub endpoint: EndpointConfig,
    /// Terminal socket reconnection
    pub reconnect: ReconnectConfig,
    /// Growth curve settings
    pub curve: CurveConfig,
    /// Terminal session settings
    pub terminal: TerminalConfig,
}

/// Execution service endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the run, analyze and trace endpoints
    pub base_url: String,
    /// WebSocket URL of the terminal stream
    pub terminal_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Terminal socket reconnection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Delay before each reconnection attempt, in milliseconds
    pub delay_ms: u64,
    /// Attempts per unexpected closure
    pub max_attempts: u32,
}

/// Growth curve settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Largest input size sampled
    pub horizon: u32,
}

/// Terminal session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Maximum number of history lines to keep
    pub max_history: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            terminal_url: "ws://localhost:8000/terminal".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self { delay_ms: 3000, max_attempts: 1 }
    }
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self { horizon: DEFAULT_HORIZON }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { max_history: 1000 }
    }
}

impl ClientConfig {
    /// Get the config file path (`$CODEVIZ_CONFIG` or `~/.codeviz.toml`)
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CODEVIZ_CONFIG) {
            return Ok(PathBuf::from(path));
        }
        let home =
            dirs::home_dir().ok_or_else(|| eyre::eyre!("Unable to determine home directory"))?;
        Ok(home.join(".codeviz.toml"))
    }

    /// Load configuration from the default path, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load configuration from `path`, creating a default file if it doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, creating default at {:?}", path);
            let default_config = Self::default();
            default_config.save_to_path(path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;

        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {path:?}"))?;

        debug!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Replace endpoints with `CODEVIZ_ENDPOINT` / `CODEVIZ_TERMINAL_URL` when set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(CODEVIZ_ENDPOINT) {
            debug!("Endpoint overridden by {}: {}", CODEVIZ_ENDPOINT, url);
            self.endpoint.base_url = url;
        }
        if let Ok(url) = std::env::var(CODEVIZ_TERMINAL_URL) {
            debug!("Terminal URL overridden by {}: {}", CODEVIZ_TERMINAL_URL, url);
            self.endpoint.terminal_url = url;
        }
    }

    /// HTTP request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.endpoint.request_timeout_secs)
    }

    /// Terminal socket reconnection policy
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            Duration::from_millis(self.reconnect.delay_ms),
            self.reconnect.max_attempts,
        )
    }
}

//! Persistent application configuration
//!
//! Stores the probe target, window width and tick interval in a JSON file
//! at `<config_dir>/pingmon/config.json`.

use pingmon_core::monitor::MonitorConfig;
use pingmon_core::probe::{self, TcpProbe, TickSchedule, MAX_INTERVAL_MS};
use pingmon_core::series::Transform;
use pingmon_server::DriverOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_host() -> String {
    probe::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    probe::DEFAULT_PORT
}

fn default_timeout_ms() -> u64 {
    probe::DEFAULT_TIMEOUT_MS
}

fn default_interval_ms() -> u64 {
    pingmon_core::DEFAULT_INTERVAL_MS
}

fn default_backoff_ms() -> u64 {
    pingmon_core::DEFAULT_BACKOFF_MS
}

fn default_window_width() -> u32 {
    pingmon_core::DEFAULT_WINDOW_WIDTH
}

/// Persistent application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Probe target host
    #[serde(default = "default_host")]
    pub host: String,
    /// Probe target TCP port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Tick interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Wait after a probe fault in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Samples visible in the window
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default)]
    pub transform: Transform,
    /// Show every other freshness threshold only
    #[serde(default)]
    pub short_view: bool,
    /// Serve the REST/WebSocket API on this port
    #[serde(default)]
    pub server_port: Option<u16>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            interval_ms: default_interval_ms(),
            backoff_ms: default_backoff_ms(),
            window_width: default_window_width(),
            transform: Transform::default(),
            short_view: false,
            server_port: None,
        }
    }
}

impl AppConfig {
    /// Config file path: `<config_dir>/pingmon/config.json`
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pingmon")
            .join("config.json")
    }

    /// Load config from the default path
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from disk, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded config from disk");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save config to disk, creating parent directories if needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Config saved to disk");
        Ok(())
    }

    /// Monitor settings; an out-of-range stored width falls back to the default
    pub fn monitor_config(&self) -> MonitorConfig {
        let window_width = if self.window_width > pingmon_core::MAX_WINDOW_WIDTH {
            tracing::warn!(
                width = self.window_width,
                "Stored window width out of range, using default"
            );
            default_window_width()
        } else {
            self.window_width
        };

        MonitorConfig {
            window_width,
            transform: self.transform,
            ..Default::default()
        }
    }

    /// Tick schedule; an out-of-range stored interval falls back to the default
    pub fn schedule(&self) -> TickSchedule {
        let interval_ms = if (1..=MAX_INTERVAL_MS).contains(&self.interval_ms) {
            self.interval_ms
        } else {
            tracing::warn!(
                interval_ms = self.interval_ms,
                "Stored interval out of range, using default"
            );
            default_interval_ms()
        };

        TickSchedule::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(self.backoff_ms),
        )
    }

    pub fn probe(&self) -> TcpProbe {
        TcpProbe::new(
            self.host.clone(),
            self.port,
            Duration::from_millis(self.timeout_ms),
        )
    }

    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            monitor: self.monitor_config(),
            schedule: self.schedule(),
            autostart: true,
            short_view: self.short_view,
        }
    }
}

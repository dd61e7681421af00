//! Framework Configuration Module
//!
//! Provides tunable framework settings loaded from TOML files. Every field
//! has a built-in default, so a missing or partial file never fails startup.
//!
//! ## Loading Order
//!
//! 1. `MOEX_CONFIG` environment variable (path to TOML file)
//! 2. `moex.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded [`MoexConfig`] is passed by value into `MoexFramework::new` —
//! there is no process-global configuration.

pub mod defaults;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a MOEX deployment.
///
/// Load with [`MoexConfig::load`], which searches:
/// 1. `$MOEX_CONFIG` env var
/// 2. `./moex.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoexConfig {
    /// Per-expert circuit breaker settings
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// Health monitor settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl MoexConfig {
    /// Load configuration using the documented search order.
    #[must_use]
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var("MOEX_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from MOEX_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from MOEX_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "MOEX_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./moex.toml
        let local = PathBuf::from("moex.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./moex.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./moex.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No moex.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

// ============================================================================
// Circuit Breaker
// ============================================================================

/// Circuit breaker tuning, applied to every registered expert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures (since the last success) before the breaker opens.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: usize,

    /// Cooldown before an open breaker re-admits a call (milliseconds).
    /// Fixed — no jitter, no exponential backoff.
    #[serde(default = "default_recovery_timeout_ms")]
    pub recovery_timeout_ms: u64,
}

impl BreakerConfig {
    /// Recovery timeout as a [`Duration`].
    #[must_use]
    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_millis(self.recovery_timeout_ms)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: defaults::FAILURE_THRESHOLD,
            recovery_timeout_ms: defaults::RECOVERY_TIMEOUT_MS,
        }
    }
}

fn default_failure_threshold() -> usize {
    defaults::FAILURE_THRESHOLD
}

fn default_recovery_timeout_ms() -> u64 {
    defaults::RECOVERY_TIMEOUT_MS
}

// ============================================================================
// Health Monitor
// ============================================================================

/// Health monitor tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Interval between health checks (milliseconds).
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// Bounded health history length.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl MonitorConfig {
    /// Check interval as a [`Duration`].
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: defaults::CHECK_INTERVAL_MS,
            history_capacity: defaults::HEALTH_HISTORY_CAPACITY,
        }
    }
}

fn default_check_interval_ms() -> u64 {
    defaults::CHECK_INTERVAL_MS
}

fn default_history_capacity() -> usize {
    defaults::HEALTH_HISTORY_CAPACITY
}

// ============================================================================
// HTTP Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP API.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: defaults::SERVER_BIND_ADDR.to_string(),
        }
    }
}

fn default_bind_addr() -> String {
    defaults::SERVER_BIND_ADDR.to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_constants() {
        let config = MoexConfig::default();
        assert_eq!(config.breaker.failure_threshold, 5);
        assert_eq!(config.breaker.recovery_timeout_ms, 60_000);
        assert_eq!(config.monitor.check_interval_ms, 30_000);
        assert_eq!(config.monitor.history_capacity, 10);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[breaker]\nfailure_threshold = 3").unwrap();

        let config = MoexConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.breaker.failure_threshold, 3);
        // Unset keys fall back to defaults
        assert_eq!(config.breaker.recovery_timeout_ms, 60_000);
        assert_eq!(config.monitor.history_capacity, 10);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml {{").unwrap();

        assert!(MoexConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_duration_helpers() {
        let config = MoexConfig::default();
        assert_eq!(config.breaker.recovery_timeout(), Duration::from_secs(60));
        assert_eq!(config.monitor.check_interval(), Duration::from_secs(30));
    }
}

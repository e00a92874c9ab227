// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Configuration module for the DAO telemetry service
//!
//! Loads configuration from environment variables (and a `.env` file).

use crate::error::{AppError, Result};
use crate::health::is_semver;
use crate::metrics::is_valid_name;


/// Default configuration values
pub mod defaults {
    pub const SERVER_ADDR: &str = "0.0.0.0:9090";
    pub const NAMESPACE: &str = "dao";
    pub const PLATFORM: &str = "kubernetes";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Environment variable names used by the application
pub mod env_vars {
    pub const SERVER_ADDR: &str = "SERVER_ADDR";
    pub const METRICS_NAMESPACE: &str = "METRICS_NAMESPACE";
    pub const SERVICE_VERSION: &str = "SERVICE_VERSION";
    pub const PLATFORM: &str = "PLATFORM";
    pub const MEMORY_LIMIT_BYTES: &str = "MEMORY_LIMIT_BYTES";
}

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_addr: String,
    /// Prefix of the process-level metric names
    pub namespace: String,
    /// Reported on `/health` and in `<namespace>_platform_info`
    pub version: String,
    pub platform: String,
    /// Resident memory above which `/health` reports degraded
    pub memory_limit_bytes: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: defaults::SERVER_ADDR.to_string(),
            namespace: defaults::NAMESPACE.to_string(),
            version: defaults::VERSION.to_string(),
            platform: defaults::PLATFORM.to_string(),
            memory_limit_bytes: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Invalid values are logged and replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(addr) = lookup(env_vars::SERVER_ADDR) {
            config.server_addr = addr;
        }
        if let Some(namespace) = lookup(env_vars::METRICS_NAMESPACE) {
            if is_valid_name(&namespace) {
                config.namespace = namespace;
            } else {
                tracing::warn!(
                    "Invalid {} '{}'. Using '{}'.",
                    env_vars::METRICS_NAMESPACE,
                    namespace,
                    defaults::NAMESPACE
                );
            }
        }
        if let Some(version) = lookup(env_vars::SERVICE_VERSION) {
            if is_semver(&version) {
                config.version = version;
            } else {
                tracing::warn!(
                    "Invalid {} '{}'. Using '{}'.",
                    env_vars::SERVICE_VERSION,
                    version,
                    defaults::VERSION
                );
            }
        }
        if let Some(platform) = lookup(env_vars::PLATFORM).filter(|p| !p.trim().is_empty()) {
            config.platform = platform;
        }
        config.memory_limit_bytes = lookup(env_vars::MEMORY_LIMIT_BYTES).and_then(|v| {
            v.parse::<u64>()
                .map_err(|e| {
                    tracing::warn!(
                        "Failed to parse {}: {}. Memory limit disabled.",
                        env_vars::MEMORY_LIMIT_BYTES,
                        e
                    );
                })
                .ok()
                .filter(|&limit| {
                    if limit == 0 {
                        tracing::warn!(
                            "{} is 0. Memory limit disabled.",
                            env_vars::MEMORY_LIMIT_BYTES
                        );
                    }
                    limit > 0
                })
        });

        if let Err(e) = config.validate() {
            tracing::error!("Invalid configuration: {}", e);
        }

        config
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !is_valid_name(&self.namespace) {
            return Err(AppError::Config(format!(
                "Invalid metrics namespace '{}': expected [a-zA-Z_][a-zA-Z0-9_]*",
                self.namespace
            )));
        }
        if !is_semver(&self.version) {
            return Err(AppError::Config(format!(
                "Invalid version '{}': expected a semantic version",
                self.version
            )));
        }
        if !self.server_addr.contains(':') {
            return Err(AppError::Config(format!(
                "Invalid server address '{}': expected 'host:port'",
                self.server_addr
            )));
        }
        if self.memory_limit_bytes == Some(0) {
            return Err(AppError::Config(
                "Memory limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::health::HealthEvaluator;
use crate::metrics::{MetricsRegistry, ProcessInfo};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub metrics: MetricsRegistry,
    pub health: HealthEvaluator,
}

impl AppState {
    /// State with an OS-backed evaluator; registers the memory limit check
    /// when one is configured
    pub fn new(config: Config, metrics: MetricsRegistry) -> Self {
        let health = HealthEvaluator::new();
        if let Some(limit) = config.memory_limit_bytes {
            health.register_memory_limit(limit);
        }
        Self {
            config,
            metrics,
            health,
        }
    }

    pub fn process_info(&self) -> ProcessInfo<'_> {
        ProcessInfo {
            namespace: &self.config.namespace,
            platform: &self.config.platform,
            version: &self.config.version,
        }
    }
}

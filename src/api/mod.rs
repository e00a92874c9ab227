//! HTTP API module for the DAO telemetry service
//!
//! Provides endpoints for health checks and Prometheus metrics export.
//!
//! # Endpoints
//! - `GET /health` — health check
//! - `GET /metrics` — Prometheus metrics

pub mod handlers;
mod state;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;

pub use state::AppState;

/// Creates the main Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}

/// Router whose requests are counted in the shared registry
pub fn create_instrumented_router(state: Arc<AppState>) -> Router {
    create_router(Arc::clone(&state)).layer(middleware::from_fn_with_state(
        state,
        handlers::track_requests,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::metrics::MetricsRegistry;

    #[test]
    fn test_create_router() {
        let config = Config {
            server_addr: "127.0.0.1:9090".to_string(),
            ..Config::default()
        };

        let app_state = Arc::new(AppState::new(config, MetricsRegistry::new()));

        let _router = create_router(app_state);
        // If we get here without panicking, the router was created successfully
    }

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new(Config::default(), MetricsRegistry::new());

        assert_eq!(state.config.server_addr, "0.0.0.0:9090");
        assert!(state.metrics.is_empty());
        assert_eq!(state.process_info().namespace, "dao");
    }

    #[test]
    fn test_app_state_registers_memory_limit() {
        let config = Config {
            memory_limit_bytes: Some(1),
            ..Config::default()
        };
        let state = AppState::new(config, MetricsRegistry::new());

        let verdict = state.health.evaluate();
        assert_eq!(verdict.checks.len(), 1);
        assert_eq!(verdict.checks[0].0, "memory");
    }
}

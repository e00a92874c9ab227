// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! # DAO Telemetry
//!
//! Health and Prometheus metrics endpoints for the DAO platform.
//!
//! Producers register counters and gauges in a shared [`MetricsRegistry`];
//! `GET /metrics` renders them together with process-level gauges, and
//! `GET /health` reports a verdict built from process signals and registered
//! subsystem checks.
//!
//! ## Main modules
//! - `api`: HTTP API handlers
//! - `config`: configuration management
//! - `error`: error types
//! - `health`: health evaluation and payloads
//! - `metrics`: metrics registry and exposition
//! - `prelude`: commonly used types and traits

mod api;
mod config;
mod error;
mod health;
mod metrics;
pub mod prelude;

// Re-export commonly used types
/// Application configuration
pub use config::Config;

/// Application error and result type
pub use error::{AppError, Result};

/// HTTP API router and state
pub use api::{AppState, create_instrumented_router, create_router};

/// Health evaluation
pub use health::{
    CheckStatus, HealthEvaluator, HealthFailure, HealthPayload, HealthStatus, HealthVerdict,
    MemoryPayload, MemoryUsage, OsSignals, ProcessSignals, SignalSource,
};

/// Metrics registry and exposition
pub use metrics::{
    CONTENT_TYPE, CounterHandle, GaugeHandle, LabelSet, MetricFamily, MetricKind, MetricsRegistry,
    ProcessInfo, SeriesSnapshot, render_exposition,
};

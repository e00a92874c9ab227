// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for convenient use.
//! Users of the library can import everything they need with:
//!
//! ```rust
//! use dao_telemetry::prelude::*;
//! ```

// Core types
pub use crate::config::Config;
pub use crate::error::{AppError, Result};

// Metrics types
pub use crate::metrics::{CounterHandle, GaugeHandle, LabelSet, MetricKind, MetricsRegistry};

// Health types
pub use crate::health::{HealthEvaluator, HealthStatus, HealthVerdict, SignalSource};

// HTTP
pub use crate::api::{AppState, create_instrumented_router, create_router};

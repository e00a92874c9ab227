// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Metrics registry and exposition module for the DAO telemetry service
//!
//! Contains label sets, the in-process counter/gauge registry and the
//! Prometheus text renderer.

mod exposition;
mod labels;
mod registry;


/// Prometheus text renderer
pub use exposition::{CONTENT_TYPE, MetricFamily, ProcessInfo, render_exposition};

/// Label sets and name rules
pub use labels::{LabelSet, is_valid_name};

/// In-process metrics registry
pub use registry::{CounterHandle, GaugeHandle, MetricKind, MetricsRegistry, SeriesSnapshot};

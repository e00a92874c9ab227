// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prometheus text exposition (format version 0.0.4)
//!
//! Output layout per family:
//!
//! ```text
//! # HELP dao_requests_total Total requests
//! # TYPE dao_requests_total counter
//! dao_requests_total{method="GET"} 3
//! ```
//!
//! Families are separated by a blank line. Rendering either produces the full
//! text or an error, never a partial body.

use std::collections::HashSet;
use std::fmt::Write;

use super::labels::{LabelSet, escape_help, is_valid_name};
use super::registry::{MetricKind, SeriesSnapshot};
use crate::error::{AppError, Result};
use crate::health::ProcessSignals;

/// Content type of the rendered text
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// One HELP/TYPE block with its sample lines
#[derive(Clone, Debug, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub samples: Vec<(LabelSet, f64)>,
}

/// Static identity of the process, exported as `<namespace>_platform_info`
#[derive(Clone, Copy, Debug)]
pub struct ProcessInfo<'a> {
    pub namespace: &'a str,
    pub platform: &'a str,
    pub version: &'a str,
}

/// Groups an ordered registry snapshot into families
pub fn families_from_snapshot(snapshot: &[SeriesSnapshot]) -> Vec<MetricFamily> {
    let mut families: Vec<MetricFamily> = Vec::new();
    for series in snapshot {
        match families.last_mut() {
            Some(family) if family.name == series.name => {
                family.samples.push((series.labels.clone(), series.value));
            }
            _ => families.push(MetricFamily {
                name: series.name.clone(),
                help: series.help.clone(),
                kind: series.kind,
                samples: vec![(series.labels.clone(), series.value)],
            }),
        }
    }
    families
}

/// Fixed process-level families. Unknown signals are left out.
pub fn process_families(info: &ProcessInfo<'_>, signals: &ProcessSignals) -> Result<Vec<MetricFamily>> {
    let ns = info.namespace;
    let memory = &signals.memory;

    let mut memory_samples = Vec::new();
    for (kind, value) in [
        ("data", memory.data_bytes),
        ("resident", memory.resident_bytes),
        ("swap", memory.swap_bytes),
        ("virtual", memory.virtual_bytes),
    ] {
        if let Some(bytes) = value {
            #[allow(clippy::cast_precision_loss)]
            memory_samples.push((LabelSet::from_pairs(&[("type", kind)])?, bytes as f64));
        }
    }

    let families = vec![
        MetricFamily {
            name: format!("{ns}_platform_info"),
            help: "Information about the DAO platform".to_string(),
            kind: MetricKind::Gauge,
            samples: vec![(
                LabelSet::from_pairs(&[("platform", info.platform), ("version", info.version)])?,
                1.0,
            )],
        },
        MetricFamily {
            name: format!("{ns}_process_memory_bytes"),
            help: "Process memory usage in bytes".to_string(),
            kind: MetricKind::Gauge,
            samples: memory_samples,
        },
        MetricFamily {
            name: format!("{ns}_process_cpu_seconds_total"),
            help: "Total user and system CPU time spent in seconds".to_string(),
            kind: MetricKind::Counter,
            samples: signals
                .cpu_seconds
                .map(|secs| vec![(LabelSet::new(), secs)])
                .unwrap_or_default(),
        },
        MetricFamily {
            name: format!("{ns}_uptime_seconds"),
            help: "Application uptime in seconds".to_string(),
            kind: MetricKind::Gauge,
            samples: vec![(LabelSet::new(), signals.uptime_seconds)],
        },
    ];

    Ok(families
        .into_iter()
        .filter(|family| !family.samples.is_empty())
        .collect())
}

/// Renders families in the given order
pub fn render(families: &[MetricFamily]) -> Result<String> {
    let mut seen = HashSet::new();
    let mut out = String::new();

    for (i, family) in families.iter().enumerate() {
        if !is_valid_name(&family.name) {
            return Err(AppError::Format(format!(
                "invalid metric name '{}'",
                family.name
            )));
        }
        if !seen.insert(family.name.as_str()) {
            return Err(AppError::Format(format!(
                "metric family '{}' rendered twice",
                family.name
            )));
        }

        if i > 0 {
            out.push('\n');
        }
        writeln!(out, "# HELP {} {}", family.name, escape_help(&family.help))?;
        writeln!(out, "# TYPE {} {}", family.name, family.kind.as_str())?;
        for (labels, value) in &family.samples {
            if labels.is_empty() {
                writeln!(out, "{} {}", family.name, format_value(*value))?;
            } else {
                writeln!(out, "{}{{{}}} {}", family.name, labels, format_value(*value))?;
            }
        }
    }

    Ok(out)
}

/// Registry families followed by the fixed process families
pub fn render_exposition(
    snapshot: &[SeriesSnapshot],
    info: &ProcessInfo<'_>,
    signals: &ProcessSignals,
) -> Result<String> {
    let mut families = families_from_snapshot(snapshot);
    families.extend(process_families(info, signals)?);
    render(&families)
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! In-process registry of counters and gauges
//!
//! Series values live in `prometheus_client` atomic cells, so producers holding a
//! handle never take a lock. The family map is only locked to register a series
//! or to copy values out for a snapshot.

mod snapshot;

pub use snapshot::SeriesSnapshot;

use crate::error::{AppError, Result};
use crate::metrics::labels::{LabelSet, validate_metric_name};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::gauge::Gauge;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type CounterCell = Counter<f64, AtomicU64>;
type GaugeCell = Gauge<f64, AtomicU64>;

/// Kind of a metric family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    /// Name used on `# TYPE` lines
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

#[derive(Clone)]
enum Cell {
    Counter(CounterCell),
    Gauge(GaugeCell),
}

impl Cell {
    fn value(&self) -> f64 {
        match self {
            Cell::Counter(c) => c.get(),
            Cell::Gauge(g) => g.get(),
        }
    }
}

struct Series {
    labels: LabelSet,
    cell: Cell,
}

struct Family {
    help: String,
    kind: MetricKind,
    // keyed by canonical label string so iteration order is the exposition order
    series: BTreeMap<String, Series>,
}

/// Handle to one counter series
#[derive(Clone, Debug)]
pub struct CounterHandle {
    name: Arc<str>,
    cell: CounterCell,
}

impl CounterHandle {
    /// Adds `delta` to the counter.
    ///
    /// Fails with [`AppError::InvalidDelta`] for negative or NaN deltas; the
    /// counter is left untouched in that case.
    pub fn increment(&self, delta: f64) -> Result<()> {
        if delta.is_nan() || delta < 0.0 {
            return Err(AppError::InvalidDelta {
                name: self.name.to_string(),
                delta,
            });
        }
        self.cell.inc_by(delta);
        Ok(())
    }

    pub fn inc(&self) {
        self.cell.inc_by(1.0);
    }

    pub fn get(&self) -> f64 {
        self.cell.get()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Handle to one gauge series
#[derive(Clone, Debug)]
pub struct GaugeHandle {
    name: Arc<str>,
    cell: GaugeCell,
}

impl GaugeHandle {
    pub fn set(&self, value: f64) {
        self.cell.set(value);
    }

    /// Moves the gauge by `delta` in either direction
    pub fn add(&self, delta: f64) {
        if delta >= 0.0 {
            self.cell.inc_by(delta);
        } else {
            self.cell.dec_by(-delta);
        }
    }

    pub fn get(&self) -> f64 {
        self.cell.get()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Process-wide metrics registry, shared by cloning
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    families: Arc<RwLock<BTreeMap<String, Family>>>,
}

impl MetricsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or looks up) a counter series
    pub fn register_counter(
        &self,
        name: &str,
        help: &str,
        labels: &[(&str, &str)],
    ) -> Result<CounterHandle> {
        let labels = LabelSet::from_pairs(labels)?;
        match self.register(name, help, MetricKind::Counter, labels)? {
            Cell::Counter(cell) => Ok(CounterHandle {
                name: Arc::from(name),
                cell,
            }),
            Cell::Gauge(_) => Err(duplicate(name, MetricKind::Gauge)),
        }
    }

    /// Registers (or looks up) a gauge series
    pub fn register_gauge(
        &self,
        name: &str,
        help: &str,
        labels: &[(&str, &str)],
    ) -> Result<GaugeHandle> {
        let labels = LabelSet::from_pairs(labels)?;
        match self.register(name, help, MetricKind::Gauge, labels)? {
            Cell::Gauge(cell) => Ok(GaugeHandle {
                name: Arc::from(name),
                cell,
            }),
            Cell::Counter(_) => Err(duplicate(name, MetricKind::Counter)),
        }
    }

    fn register(&self, name: &str, help: &str, kind: MetricKind, labels: LabelSet) -> Result<Cell> {
        validate_metric_name(name)?;
        let canonical = labels.canonical();

        // existing series only need the shared lock
        if let Some(family) = self.read().get(name) {
            if family.kind != kind {
                return Err(duplicate(name, family.kind));
            }
            if let Some(series) = family.series.get(&canonical) {
                return Ok(series.cell.clone());
            }
        }

        let mut families = self.write();
        let family = families.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!("Registered {} family {}", kind.as_str(), name);
            Family {
                help: help.to_string(),
                kind,
                series: BTreeMap::new(),
            }
        });
        if family.kind != kind {
            return Err(duplicate(name, family.kind));
        }

        let series = family
            .series
            .entry(canonical)
            .or_insert_with(|| Series {
                cell: match kind {
                    MetricKind::Counter => Cell::Counter(CounterCell::default()),
                    MetricKind::Gauge => Cell::Gauge(GaugeCell::default()),
                },
                labels,
            });
        Ok(series.cell.clone())
    }

    /// Number of registered series across all families
    pub fn len(&self) -> usize {
        self.read().values().map(|f| f.series.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if a family with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Family>> {
        // values are atomics, a panicking writer cannot leave a torn series behind
        self.families.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Family>> {
        self.families.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn duplicate(name: &str, existing: MetricKind) -> AppError {
    AppError::DuplicateSeries {
        name: name.to_string(),
        existing: existing.as_str(),
    }
}

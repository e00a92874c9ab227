// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Point-in-time copies of registry contents

use super::{MetricKind, MetricsRegistry};
use crate::metrics::labels::LabelSet;

/// Value of one series at the time of the snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesSnapshot {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub labels: LabelSet,
    pub value: f64,
}

impl MetricsRegistry {
    /// Copies every series out of the registry.
    ///
    /// Ordered by metric name, then by canonical label string. The read lock is
    /// held only while values are copied; producers updating existing series
    /// are never blocked by it.
    pub fn snapshot(&self) -> Vec<SeriesSnapshot> {
        let families = self.read();
        let mut out = Vec::with_capacity(families.values().map(|f| f.series.len()).sum());
        for (name, family) in families.iter() {
            for series in family.series.values() {
                out.push(SeriesSnapshot {
                    name: name.clone(),
                    help: family.help.clone(),
                    kind: family.kind,
                    labels: series.labels.clone(),
                    value: series.cell.value(),
                });
            }
        }
        out
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Health evaluation for liveness/readiness probes
//!
//! A [`HealthEvaluator`] gathers process signals and runs registered subsystem
//! checks, producing a fresh [`HealthVerdict`] on every call.

mod parsers;
mod payload;
mod signals;

pub use payload::{HealthFailure, HealthPayload, MemoryPayload};
pub(crate) use payload::is_semver;
pub use signals::{MemoryUsage, OsSignals, ProcessSignals, SignalSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

/// Overall health classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Healthy and degraded processes still serve traffic
    pub fn is_serving(self) -> bool {
        !matches!(self, HealthStatus::Unhealthy)
    }
}

/// Outcome of a single subsystem check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// Result of one evaluation
#[derive(Clone, Debug, PartialEq)]
pub struct HealthVerdict {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub signals: ProcessSignals,
    /// Subsystem results in registration order
    pub checks: Vec<(String, CheckStatus)>,
    /// First failing check that decided the status, if any
    pub reason: Option<String>,
}

type CheckFn = Arc<dyn Fn() -> bool + Send + Sync>;

#[derive(Clone)]
struct RegisteredCheck {
    name: String,
    critical: bool,
    check: CheckFn,
}

/// Computes health verdicts from process signals and subsystem checks
pub struct HealthEvaluator {
    started: Instant,
    source: Arc<dyn SignalSource>,
    checks: RwLock<Vec<RegisteredCheck>>,
}

impl Default for HealthEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthEvaluator {
    /// Evaluator reading the running process; uptime counts from now
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(Arc::new(OsSignals))
    }

    #[must_use]
    pub fn with_source(source: Arc<dyn SignalSource>) -> Self {
        Self {
            started: Instant::now(),
            source,
            checks: RwLock::new(Vec::new()),
        }
    }

    /// Registers a critical check; a failure makes the process unhealthy
    pub fn register_check<F>(&self, name: &str, check: F)
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.push_check(name, true, Arc::new(check));
    }

    /// Registers a non-critical check; a failure only degrades the process
    pub fn register_soft_check<F>(&self, name: &str, check: F)
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.push_check(name, false, Arc::new(check));
    }

    /// Registers a soft `memory` check failing once resident memory exceeds
    /// `limit_bytes`. Unknown memory passes.
    pub fn register_memory_limit(&self, limit_bytes: u64) {
        let source = Arc::clone(&self.source);
        self.register_soft_check("memory", move || {
            match source.memory().map(|m| m.resident_bytes) {
                Ok(Some(resident)) => resident <= limit_bytes,
                _ => true,
            }
        });
    }

    /// Check names are unique; registering a name again replaces the earlier
    /// check in place
    fn push_check(&self, name: &str, critical: bool, check: CheckFn) {
        let registered = RegisteredCheck {
            name: name.to_string(),
            critical,
            check,
        };

        let mut checks = self.checks.write().unwrap_or_else(PoisonError::into_inner);
        match checks.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                tracing::warn!("Health check '{}' registered again, replacing it", name);
                *existing = registered;
            }
            None => {
                tracing::debug!("Registered health check '{}' (critical: {})", name, critical);
                checks.push(registered);
            }
        }
    }

    /// Reads process signals; any signal that cannot be read is left unknown
    pub fn signals(&self) -> ProcessSignals {
        let memory = gather("memory", || self.source.memory()).unwrap_or_default();
        let cpu_seconds = gather("cpu", || self.source.cpu_seconds());
        ProcessSignals {
            uptime_seconds: self.started.elapsed().as_secs_f64(),
            memory,
            cpu_seconds,
        }
    }

    /// Produces a fresh verdict. Never fails: unreadable signals are unknown,
    /// panicking checks count as failed.
    pub fn evaluate(&self) -> HealthVerdict {
        let signals = self.signals();

        // checks run without the lock held
        let checks = self
            .checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut results = Vec::with_capacity(checks.len());
        let mut first_critical = None;
        let mut first_soft = None;
        for registered in &checks {
            let passed = catch_unwind(AssertUnwindSafe(|| (registered.check)())).unwrap_or_else(|_| {
                tracing::warn!("Health check '{}' panicked", registered.name);
                false
            });
            let status = if passed {
                CheckStatus::Pass
            } else {
                tracing::warn!("Health check '{}' failed", registered.name);
                let slot = if registered.critical {
                    &mut first_critical
                } else {
                    &mut first_soft
                };
                slot.get_or_insert_with(|| registered.name.clone());
                CheckStatus::Fail
            };
            results.push((registered.name.clone(), status));
        }

        let (status, reason) = match (first_critical, first_soft) {
            (Some(name), _) => (HealthStatus::Unhealthy, Some(format!("check '{name}' failed"))),
            (None, Some(name)) => (HealthStatus::Degraded, Some(format!("check '{name}' failed"))),
            (None, None) => (HealthStatus::Healthy, None),
        };

        HealthVerdict {
            status,
            timestamp: Utc::now(),
            signals,
            checks: results,
            reason,
        }
    }
}

fn gather<T>(signal: &str, read: impl FnOnce() -> crate::error::Result<T>) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(read)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::debug!("Signal '{}' unknown: {}", signal, e);
            None
        }
        Err(_) => {
            tracing::debug!("Signal '{}' unknown: reader panicked", signal);
            None
        }
    }
}

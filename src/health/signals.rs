// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Process-level signals: memory and CPU time

use crate::error::{AppError, Result};

/// Memory usage of the current process, in bytes. `None` means unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    pub resident_bytes: Option<u64>,
    pub virtual_bytes: Option<u64>,
    pub data_bytes: Option<u64>,
    pub swap_bytes: Option<u64>,
}

/// Signals observed during one evaluation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProcessSignals {
    pub uptime_seconds: f64,
    pub memory: MemoryUsage,
    /// User + system CPU time consumed so far
    pub cpu_seconds: Option<f64>,
}

/// Source of process memory and CPU readings
pub trait SignalSource: Send + Sync {
    fn memory(&self) -> Result<MemoryUsage>;
    fn cpu_seconds(&self) -> Result<f64>;
}

/// Reads signals of the running process from the operating system
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSignals;

impl SignalSource for OsSignals {
    #[cfg(target_os = "linux")]
    fn memory(&self) -> Result<MemoryUsage> {
        use super::parsers::parse_status_kib;

        let status = std::fs::read_to_string("/proc/self/status")
            .map_err(|e| AppError::SignalGather(format!("/proc/self/status: {e}")))?;
        Ok(MemoryUsage {
            resident_bytes: parse_status_kib(&status, "VmRSS"),
            virtual_bytes: parse_status_kib(&status, "VmSize"),
            data_bytes: parse_status_kib(&status, "VmData"),
            swap_bytes: parse_status_kib(&status, "VmSwap"),
        })
    }

    #[cfg(not(target_os = "linux"))]
    fn memory(&self) -> Result<MemoryUsage> {
        Err(AppError::SignalGather(
            "process memory is only available on Linux".to_string(),
        ))
    }

    #[cfg(unix)]
    fn cpu_seconds(&self) -> Result<f64> {
        use nix::sys::resource::{UsageWho, getrusage};

        let usage = getrusage(UsageWho::RUSAGE_SELF)
            .map_err(|e| AppError::SignalGather(format!("getrusage: {e}")))?;
        Ok(timeval_secs(usage.user_time()) + timeval_secs(usage.system_time()))
    }

    #[cfg(not(unix))]
    fn cpu_seconds(&self) -> Result<f64> {
        Err(AppError::SignalGather(
            "process CPU time is only available on Unix".to_string(),
        ))
    }
}

#[cfg(unix)]
#[allow(clippy::cast_precision_loss)]
fn timeval_secs(tv: nix::sys::time::TimeVal) -> f64 {
    tv.tv_sec() as f64 + tv.tv_usec() as f64 / 1_000_000.0
}

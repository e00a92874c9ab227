//! JSON bodies of the health endpoint

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CheckStatus, HealthStatus, HealthVerdict};
use crate::error::{AppError, Result};

/// Memory section of the health payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryPayload {
    pub used_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
}

/// Health endpoint response structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthPayload {
    pub status: HealthStatus,
    pub timestamp: String,
    pub uptime_seconds: f64,
    pub memory: MemoryPayload,
    pub version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checks: BTreeMap<String, CheckStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthPayload {
    /// Builds the payload for a verdict.
    ///
    /// Fails when `version` is not a semantic version, so a misconfigured
    /// process never reports itself healthy.
    pub fn from_verdict(verdict: &HealthVerdict, version: &str) -> Result<Self> {
        if !is_semver(version) {
            return Err(AppError::Format(format!(
                "version '{version}' is not a semantic version"
            )));
        }
        let uptime_seconds = verdict.signals.uptime_seconds;
        if !uptime_seconds.is_finite() || uptime_seconds < 0.0 {
            return Err(AppError::Format(format!("invalid uptime {uptime_seconds}")));
        }

        Ok(Self {
            status: verdict.status,
            timestamp: iso8601(&verdict.timestamp),
            uptime_seconds,
            memory: MemoryPayload {
                used_bytes: verdict.signals.memory.resident_bytes,
                total_bytes: verdict.signals.memory.virtual_bytes,
            },
            version: version.to_string(),
            checks: merge_checks(&verdict.checks),
            error: match verdict.status {
                HealthStatus::Unhealthy => verdict.reason.clone(),
                _ => None,
            },
        })
    }
}

/// Body returned when no verdict could be produced at all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthFailure {
    pub status: HealthStatus,
    pub error: String,
    pub timestamp: String,
}

impl HealthFailure {
    pub fn new(error: impl Into<String>, at: &DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            error: error.into(),
            timestamp: iso8601(at),
        }
    }
}

/// A name listed more than once reports `fail` if any of its results failed
fn merge_checks(checks: &[(String, CheckStatus)]) -> BTreeMap<String, CheckStatus> {
    let mut merged = BTreeMap::new();
    for (name, status) in checks {
        merged
            .entry(name.clone())
            .and_modify(|existing| {
                if *status == CheckStatus::Fail {
                    *existing = CheckStatus::Fail;
                }
            })
            .or_insert(*status);
    }
    merged
}

fn iso8601(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `MAJOR.MINOR.PATCH` with optional `-pre` and `+build` suffixes
pub(crate) fn is_semver(version: &str) -> bool {
    let (rest, build) = match version.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (version, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let numeric = |part: &str| {
        !part.is_empty()
            && part.chars().all(|c| c.is_ascii_digit())
            && (part == "0" || !part.starts_with('0'))
    };
    let ident = |part: &str| {
        part.split('.')
            .all(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
    };

    let parts: Vec<&str> = core.split('.').collect();
    parts.len() == 3
        && parts.iter().copied().all(numeric)
        && pre.is_none_or(ident)
        && build.is_none_or(ident)
}

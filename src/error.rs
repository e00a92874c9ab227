// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Error types for the DAO telemetry service

use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Series name already bound to a different metric kind
    #[error("Duplicate series '{name}': already registered as {existing}")]
    DuplicateSeries { name: String, existing: &'static str },

    /// Counter increment with a negative or NaN delta
    #[error("Invalid delta {delta} for counter '{name}'")]
    InvalidDelta { name: String, delta: f64 },

    /// Metric or label name outside `[a-zA-Z_][a-zA-Z0-9_]*`
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// A single process signal could not be read
    #[error("Signal gather failure: {0}")]
    SignalGather(String),

    /// Rendering of a snapshot failed
    #[error("Format error: {0}")]
    Format(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or IO error
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Address parsing error
    #[error("Address parse error")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl From<std::fmt::Error> for AppError {
    fn from(error: std::fmt::Error) -> Self {
        Self::Format(error.to_string())
    }
}

/// Convenient alias for Result with application error
pub type Result<T> = std::result::Result<T, AppError>;

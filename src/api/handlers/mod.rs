// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

mod health;
mod metrics;
mod requests;

pub use health::health_check;
pub use metrics::metrics_handler;
pub use requests::track_requests;

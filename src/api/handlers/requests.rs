// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Request counting middleware installed by the host binary

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::AppState;

/// Counts every request in `<namespace>_http_requests_total{method,status}`
pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = method_label(request.method());
    let response = next.run(request).await;
    let status = response.status().as_u16().to_string();

    let name = format!("{}_http_requests_total", state.config.namespace);
    match state.metrics.register_counter(
        &name,
        "Total number of HTTP requests",
        &[("method", method), ("status", status.as_str())],
    ) {
        Ok(counter) => counter.inc(),
        Err(e) => tracing::error!("Failed to record request: {}", e),
    }

    response
}

/// Maps the request method onto a fixed label set; extension methods
/// collapse into `other`
fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "PATCH" => "PATCH",
        "DELETE" => "DELETE",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        _ => "other",
    }
}

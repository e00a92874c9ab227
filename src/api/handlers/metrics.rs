use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::metrics::{CONTENT_TYPE, render_exposition};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    tracing::debug!("/metrics render snapshot");
    let signals = state.health.signals();
    match render_exposition(&state.metrics.snapshot(), &state.process_info(), &signals) {
        Ok(metrics_text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE)],
            metrics_text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Failed to generate metrics",
                }),
            )
                .into_response()
        }
    }
}

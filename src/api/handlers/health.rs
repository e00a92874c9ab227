use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::AppState;
use crate::health::{HealthFailure, HealthPayload};

/// GET /health
///
/// Liveness/readiness probe. Returns 200 while the process is healthy or
/// degraded and 503 when it is unhealthy or no verdict could be built.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    // checks are plain closures and may block
    let eval_state = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        let verdict = eval_state.health.evaluate();
        HealthPayload::from_verdict(&verdict, &eval_state.config.version)
    })
    .await;

    match outcome {
        Ok(Ok(payload)) => {
            let status = if payload.status.is_serving() {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            (status, Json(payload)).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to build health payload: {}", e);
            failure_response()
        }
        Err(e) => {
            tracing::error!("Health evaluation task failed: {}", e);
            failure_response()
        }
    }
}

fn failure_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthFailure::new("Health check failed", &Utc::now())),
    )
        .into_response()
}

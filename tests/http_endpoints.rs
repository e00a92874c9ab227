// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

use axum::Router;
use axum::http::{Method, Request, StatusCode};
use dao_telemetry::{
    AppError, AppState, Config, HealthEvaluator, MemoryUsage, MetricsRegistry, Result,
    SignalSource, create_instrumented_router, create_router,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

struct FakeSignals {
    resident: Option<u64>,
}

impl SignalSource for FakeSignals {
    fn memory(&self) -> Result<MemoryUsage> {
        match self.resident {
            Some(resident) => Ok(MemoryUsage {
                resident_bytes: Some(resident),
                virtual_bytes: Some(resident * 2),
                data_bytes: Some(resident / 2),
                swap_bytes: Some(0),
            }),
            None => Err(AppError::SignalGather("unavailable".to_string())),
        }
    }

    fn cpu_seconds(&self) -> Result<f64> {
        Ok(2.5)
    }
}

fn make_state_with(config: Config, resident: Option<u64>) -> Arc<AppState> {
    Arc::new(AppState {
        config,
        metrics: MetricsRegistry::new(),
        health: HealthEvaluator::with_source(Arc::new(FakeSignals { resident })),
    })
}

fn make_state() -> Arc<AppState> {
    make_state_with(Config::default(), Some(1_048_576))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let resp = app
        .oneshot(Request::get(uri).body(String::new()).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .map(|ct| ct.to_str().unwrap().to_string());
    let body = String::from_utf8(
        resp.into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec(),
    )
    .unwrap();

    (status, content_type, body)
}

// --- /metrics endpoint ---

#[tokio::test]
async fn metrics_returns_200_with_text_content_type() {
    let (status, content_type, _) = get(create_router(make_state()), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain; version=0.0.4"));
}

#[tokio::test]
async fn metrics_without_series_still_has_process_gauges() {
    let state = make_state();
    assert!(state.metrics.is_empty());

    let (status, _, body) = get(create_router(state), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    for family in [
        "dao_platform_info",
        "dao_process_memory_bytes",
        "dao_process_cpu_seconds_total",
        "dao_uptime_seconds",
    ] {
        assert!(body.contains(&format!("# HELP {family} ")), "missing HELP for {family}");
        assert!(body.contains(&format!("# TYPE {family} ")), "missing TYPE for {family}");
    }
    assert!(body.contains("dao_process_memory_bytes{type=\"resident\"} 1048576\n"));
    assert!(body.contains("dao_process_cpu_seconds_total 2.5\n"));
    assert!(body.contains(&format!(
        "dao_platform_info{{platform=\"kubernetes\",version=\"{}\"}} 1\n",
        env!("CARGO_PKG_VERSION")
    )));
}

#[tokio::test]
async fn metrics_contains_registered_series() {
    let state = make_state();
    let requests = state
        .metrics
        .register_counter("dao_http_requests_total", "Total number of HTTP requests", &[
            ("method", "GET"),
            ("status", "200"),
        ])
        .unwrap();
    requests.increment(3.0).unwrap();
    state
        .metrics
        .register_gauge("dao_active_tenants", "Number of active tenants", &[])
        .unwrap()
        .set(12.0);

    let (_, _, body) = get(create_router(state), "/metrics").await;

    assert!(body.contains(
        "# HELP dao_http_requests_total Total number of HTTP requests\n\
         # TYPE dao_http_requests_total counter\n\
         dao_http_requests_total{method=\"GET\",status=\"200\"} 3\n"
    ));
    assert!(body.contains("dao_active_tenants 12\n"));
}

#[tokio::test]
async fn metrics_omits_unknown_memory() {
    let state = make_state_with(Config::default(), None);

    let (status, _, body) = get(create_router(state), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("dao_process_memory_bytes"));
    assert!(body.contains("dao_uptime_seconds "));
}

#[tokio::test]
async fn metrics_returns_500_json_when_rendering_fails() {
    let config = Config {
        namespace: "dao-platform".to_string(),
        ..Config::default()
    };
    let (status, content_type, body) = get(create_router(make_state_with(config, Some(1))), "/metrics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "Failed to generate metrics");
}

#[tokio::test]
async fn metrics_returns_500_on_family_collision() {
    let state = make_state();
    state
        .metrics
        .register_gauge("dao_uptime_seconds", "Clashes with the process gauge", &[])
        .unwrap();

    let (status, _, body) = get(create_router(state), "/metrics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("# HELP"));
}

// --- /health endpoint ---

#[tokio::test]
async fn health_returns_200_without_checks() {
    let (status, content_type, body) = get(create_router(make_state()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(health["memory"]["usedBytes"], 1_048_576);
    assert_eq!(health["memory"]["totalBytes"], 2_097_152);
    assert!(health["uptimeSeconds"].as_f64().unwrap() >= 0.0);
    assert!(health["timestamp"].as_str().unwrap().ends_with('Z'));
    assert!(health.get("error").is_none());
}

#[tokio::test]
async fn health_is_healthy_regardless_of_memory() {
    for resident in [None, Some(1), Some(u64::MAX / 4)] {
        let state = make_state_with(Config::default(), resident);
        let (status, _, body) = get(create_router(state), "/health").await;

        assert_eq!(status, StatusCode::OK);
        let health: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["status"], "healthy");
    }
}

#[tokio::test]
async fn health_returns_503_when_critical_check_fails() {
    let state = make_state();
    state.health.register_check("database", || false);
    state.health.register_check("cache", || true);

    let (status, _, body) = get(create_router(state), "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "unhealthy");
    assert_eq!(health["error"], "check 'database' failed");
    assert_eq!(health["checks"]["database"], "fail");
    assert_eq!(health["checks"]["cache"], "pass");
}

#[tokio::test]
async fn health_returns_200_when_degraded() {
    let state = make_state();
    state.health.register_soft_check("search_index", || false);

    let (status, _, body) = get(create_router(state), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["checks"]["search_index"], "fail");
}

#[tokio::test]
async fn health_memory_limit_degrades() {
    let config = Config {
        memory_limit_bytes: Some(1024),
        ..Config::default()
    };
    let state = make_state_with(config, Some(4096));
    state.health.register_memory_limit(1024);

    let (status, _, body) = get(create_router(state), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["checks"]["memory"], "fail");
}

#[tokio::test]
async fn health_returns_503_failure_body_when_payload_cannot_be_built() {
    let config = Config {
        version: "latest".to_string(),
        ..Config::default()
    };
    let (status, _, body) = get(create_router(make_state_with(config, Some(1))), "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "unhealthy");
    assert_eq!(health["error"], "Health check failed");
    assert!(health["timestamp"].is_string());
    assert!(health.get("version").is_none());
}

// --- request instrumentation ---

#[tokio::test]
async fn instrumented_router_counts_requests() {
    let state = make_state();
    let app = create_instrumented_router(Arc::clone(&state));

    get(app.clone(), "/health").await;
    get(app.clone(), "/health").await;
    get(app.clone(), "/unknown").await;

    let (_, _, body) = get(app, "/metrics").await;

    // the scrape itself is counted after the body is rendered
    assert!(body.contains("dao_http_requests_total{method=\"GET\",status=\"200\"} 2\n"));
    assert!(body.contains("dao_http_requests_total{method=\"GET\",status=\"404\"} 1\n"));
}

#[tokio::test]
async fn extension_methods_share_one_series() {
    let state = make_state();
    let app = create_instrumented_router(Arc::clone(&state));

    for i in 0..50 {
        let method = Method::from_bytes(format!("X{i}").as_bytes()).unwrap();
        app.clone()
            .oneshot(Request::builder().method(method).uri("/nope").body(String::new()).unwrap())
            .await
            .unwrap();
    }
    app.clone()
        .oneshot(Request::post("/nope").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(state.metrics.len(), 2);
    let (_, _, body) = get(app, "/metrics").await;
    assert!(body.contains("dao_http_requests_total{method=\"other\",status=\"404\"} 50\n"));
    assert!(body.contains("dao_http_requests_total{method=\"POST\",status=\"404\"} 1\n"));
    assert!(!body.contains("method=\"X1\""));
}

#[tokio::test]
async fn plain_router_does_not_count_requests() {
    let state = make_state();
    get(create_router(Arc::clone(&state)), "/health").await;

    assert!(state.metrics.is_empty());
}

// --- 404 for unknown routes ---

#[tokio::test]
async fn unknown_route_returns_404() {
    let (status, _, _) = get(create_router(make_state()), "/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

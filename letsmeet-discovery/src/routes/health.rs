use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::RunQueryDsl;
use std::sync::Arc;

use letsmeet_shared::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

/// Health check probing the database and the cache backend. A missing cache
/// only degrades the service, it never fails it.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let db_check = match state.db.get() {
        Ok(mut conn) => match diesel::sql_query("SELECT 1").execute(&mut conn) {
            Ok(_) => HealthCheck::passing("postgres"),
            Err(e) => HealthCheck::failing("postgres", e.to_string()),
        },
        Err(e) => HealthCheck::failing("postgres", e.to_string()),
    };

    let cache_check = match &state.redis {
        Some(redis) => match redis.ping().await {
            Ok(()) => HealthCheck::passing("redis"),
            Err(e) => HealthCheck::degraded("redis", e.to_string()),
        },
        None => HealthCheck::degraded("redis", "cache disabled"),
    };

    let response = HealthResponse::healthy("letsmeet-discovery", env!("CARGO_PKG_VERSION"))
        .with_checks(vec![db_check, cache_check]);

    let status = match response.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status, Json(response)).into_response()
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}

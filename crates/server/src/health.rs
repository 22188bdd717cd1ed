use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use beacon_upstream::{CustomerSource, EXHAUSTED_CANDIDATES_MESSAGE};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    source: Arc<CustomerSource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub upstream: HealthCheck,
    pub checked_at: String,
}

pub fn router(source: Arc<CustomerSource>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { source })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let upstream = upstream_check(&state.source).await;
    let ready = upstream.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "beacon-server runtime initialized".to_string(),
        },
        upstream,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn upstream_check(source: &CustomerSource) -> HealthCheck {
    let outcome = source.fetch_candidates().await;
    match (outcome.data.is_some(), outcome.endpoints_tried.last()) {
        (true, Some(endpoint)) => {
            HealthCheck { status: "ready", detail: format!("owners served by {endpoint}") }
        }
        _ => HealthCheck {
            status: "degraded",
            detail: outcome.error.unwrap_or_else(|| EXHAUSTED_CANDIDATES_MESSAGE.to_string()),
        },
    }
}

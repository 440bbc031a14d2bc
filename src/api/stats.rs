//! Health and status endpoints

use axum::{
    Json,
    extract::{Query, State as AxumState},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::Ordering;

use crate::SharedState;

const SERVER_NAME: &str = "chat_trigger_hook";

/// Server statistics
#[derive(Debug, Serialize)]
pub struct ServerStats {
    pub name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: String,
}

/// Webhook request statistics
#[derive(Debug, Serialize)]
pub struct HookRequestStats {
    pub requests: u64,
    pub builds_triggered: u64,
    pub trigger_failures: u64,
}

/// Combined status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub server: ServerStats,
    pub hooks: HookRequestStats,
}

/// Root health check endpoint
/// Supports ?format=json for a JSON response
pub async fn root(
    AxumState(state): AxumState<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if params.get("format").map(String::as_str) == Some("json") {
        Json(json!({
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": state.start_time.elapsed().as_secs(),
            "status": "healthy"
        }))
        .into_response()
    } else {
        format!("{} - healthy", SERVER_NAME).into_response()
    }
}

/// GET /status - server info and webhook counters
pub async fn status(AxumState(state): AxumState<SharedState>) -> Json<StatusResponse> {
    let stats = &state.stats;

    Json(StatusResponse {
        server: ServerStats {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            started_at: state.started_at.to_rfc3339(),
        },
        hooks: HookRequestStats {
            requests: stats.requests.load(Ordering::Relaxed),
            builds_triggered: stats.builds_triggered.load(Ordering::Relaxed),
            trigger_failures: stats.trigger_failures.load(Ordering::Relaxed),
        },
    })
}

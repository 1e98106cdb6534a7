//! REST API endpoints for pingmon
//!
//! All endpoints are under /api/v1/ and return JSON.

use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use pingmon_core::monitor::MonitorSnapshot;
use serde::{Deserialize, Serialize};

type ApiError = (StatusCode, String);

fn internal(e: anyhow::Error) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Application status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub target: String,
    pub monitoring: bool,
    pub index: u64,
    pub faults: u64,
}

/// Configuration response
#[derive(Serialize, Deserialize)]
pub struct ConfigResponse {
    pub window_width: u32,
    pub interval_ms: u64,
    pub backoff_ms: u64,
    pub monitoring: bool,
}

/// A selection value as sent by a combo box: number or string
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Selection {
    Number(u64),
    Text(String),
    /// Anything else; always rejected downstream
    Other(serde_json::Value),
}

impl Selection {
    fn into_string(self) -> String {
        match self {
            Selection::Number(n) => n.to_string(),
            Selection::Text(s) => s,
            Selection::Other(v) => v.to_string(),
        }
    }
}

/// Configuration update request
///
/// Invalid values are ignored and the previous setting is kept.
#[derive(Deserialize)]
pub struct ConfigUpdate {
    pub window_width: Option<Selection>,
    pub interval_ms: Option<Selection>,
}

/// Monitoring toggle request
#[derive(Deserialize)]
pub struct MonitoringRequest {
    pub enabled: bool,
}

/// Remote URL response
#[derive(Serialize)]
pub struct RemoteUrlResponse {
    pub url: String,
}

/// GET /api/v1/status
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.monitor.get_status().await.map_err(internal)?;

    Ok(Json(StatusResponse {
        version: pingmon_core::VERSION.to_string(),
        target: status.target,
        monitoring: status.running,
        index: status.index,
        faults: status.faults,
    }))
}

/// GET /api/v1/snapshot
pub async fn get_snapshot(
    State(state): State<AppState>,
) -> Result<Json<MonitorSnapshot>, ApiError> {
    let snapshot = state.monitor.snapshot().await.map_err(internal)?;
    Ok(Json(snapshot))
}

/// GET /api/v1/config
pub async fn get_config(
    State(state): State<AppState>,
) -> Result<Json<ConfigResponse>, ApiError> {
    current_config(&state).await
}

/// PATCH /api/v1/config
pub async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<ConfigUpdate>,
) -> Result<Json<ConfigResponse>, ApiError> {
    if let Some(width) = update.window_width {
        state
            .monitor
            .set_window_width(width.into_string())
            .await
            .map_err(internal)?;
    }

    if let Some(interval) = update.interval_ms {
        state
            .monitor
            .set_interval(interval.into_string())
            .await
            .map_err(internal)?;
    }

    current_config(&state).await
}

async fn current_config(state: &AppState) -> Result<Json<ConfigResponse>, ApiError> {
    let status = state.monitor.get_status().await.map_err(internal)?;

    Ok(Json(ConfigResponse {
        window_width: status.window_width,
        interval_ms: status.interval_ms,
        backoff_ms: status.backoff_ms,
        monitoring: status.running,
    }))
}

/// POST /api/v1/monitoring
pub async fn toggle_monitoring(
    State(state): State<AppState>,
    Json(req): Json<MonitoringRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .monitor
        .set_running(req.enabled)
        .await
        .map_err(internal)?;
    get_status(State(state)).await
}

/// POST /api/v1/timeout
///
/// Records a failed sample immediately, as if a probe had timed out.
pub async fn inject_timeout(
    State(state): State<AppState>,
) -> Result<Json<MonitorSnapshot>, ApiError> {
    state.monitor.inject_failure().await.map_err(internal)?;
    get_snapshot(State(state)).await
}

/// GET /api/v1/remote-url
///
/// Returns the URL for reaching this server from other devices.
pub async fn get_remote_url(State(state): State<AppState>) -> Json<RemoteUrlResponse> {
    let ip = local_ip_address::local_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|_| "localhost".to_string());
    Json(RemoteUrlResponse {
        url: format!("http://{}:{}", ip, state.config.port),
    })
}

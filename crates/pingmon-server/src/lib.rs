//! Pingmon Web Server - Axum REST + WebSocket
//!
//! Exposes monitor snapshots to an external renderer, accessible from both
//! the local desktop and remote browsers.

pub mod api;
pub mod driver;
pub mod ws;

pub use driver::{DriverOptions, DriverStatus, MonitorCommand, MonitorHandle};

use axum::http::{header, HeaderValue};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the driver thread
    pub monitor: MonitorHandle,
    /// Server configuration
    pub config: ServerConfig,
}

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind address
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8930,
            bind_addr: "0.0.0.0".to_string(),
        }
    }
}

impl AppState {
    pub fn new(monitor: MonitorHandle, config: ServerConfig) -> Self {
        Self { monitor, config }
    }
}

/// Build the Axum router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/status", axum::routing::get(api::get_status))
        .route("/api/v1/snapshot", axum::routing::get(api::get_snapshot))
        .route(
            "/api/v1/config",
            axum::routing::get(api::get_config).patch(api::update_config),
        )
        .route(
            "/api/v1/monitoring",
            axum::routing::post(api::toggle_monitoring),
        )
        .route("/api/v1/timeout", axum::routing::post(api::inject_timeout))
        .route(
            "/api/v1/remote-url",
            axum::routing::get(api::get_remote_url),
        )
        .route("/api/v1/ws", axum::routing::get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

/// Serve on an already-bound listener
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Start the web server
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.bind_addr, state.config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Pingmon web server listening");
    serve(listener, state).await
}

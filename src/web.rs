//! Axum-based HTTP surface for the published reading

use crate::config::Config;
use crate::error::{EpexError, Result};
use crate::sensor::{EpexImbalanceSensor, Sensor};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub sensor: Arc<EpexImbalanceSensor>,
    pub config: Arc<Config>,
}

pub(crate) async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn version() -> impl IntoResponse {
    Json(json!({ "version": env!("APP_VERSION") }))
}

fn reading_json(sensor: &EpexImbalanceSensor) -> Value {
    let latest = sensor.latest();
    json!({
        "name": sensor.name(),
        "state": sensor.state(),
        "attributes": sensor.attributes(),
        "observed_at": latest.as_ref().map(|r| r.observed_at.to_rfc3339()),
        "components": latest.as_ref().map(|r| r.records()).unwrap_or_default(),
    })
}

pub(crate) async fn reading(State(state): State<AppState>) -> impl IntoResponse {
    Json(reading_json(&state.sensor))
}

pub(crate) async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    let ran = state.sensor.update().await;
    let mut body = reading_json(&state.sensor);
    body["refreshed"] = json!(ran);
    let status = if ran {
        StatusCode::OK
    } else {
        StatusCode::TOO_MANY_REQUESTS
    };
    (status, Json(body))
}

pub(crate) async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    match serde_json::to_value(state.config.as_ref()) {
        Ok(v) => (StatusCode::OK, Json(v)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/version", get(version))
        .route("/api/reading", get(reading))
        .route("/api/refresh", post(refresh))
        .route("/api/config", get(get_config))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let router = build_router(state);
    let logger = crate::logging::get_logger("web");

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!(
                "Invalid host '{}'; falling back to 127.0.0.1",
                host
            ));
            ([127, 0, 0, 1], port).into()
        }
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EpexError::web(format!("Failed to bind {addr}: {e}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| EpexError::web(e.to_string()))?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (API /api)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router)
        .await
        .map_err(|e| EpexError::web(format!("Server stopped: {e}")))
}

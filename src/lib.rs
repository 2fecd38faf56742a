//! Servidor de seguimiento de autobuses
//!
//! Motor de progresión de checkpoints sobre sesiones de conducción: cada
//! ubicación GPS recibida avanza, como mucho, un checkpoint de la ruta
//! (pending → approaching → arrived → departed).

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::Json,
    routing::get,
    BoxError, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::middleware::cors_layer;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "bus-tracking";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Construir el router completo de la API
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/routes", routes::route_routes::create_route_router())
        .nest("/api/drive", routes::drive_routes::create_drive_router())
        .nest("/api/gps", routes::gps_routes::create_gps_router())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!("⏱️ Request excedió el tiempo límite de {:?}", REQUEST_TIMEOUT);
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({
                "error": "REQUEST_TIMEOUT",
                "message": "Request timed out",
            })),
        );
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "INTERNAL_ERROR",
            "message": format!("Unhandled internal error: {}", err),
        })),
    )
}

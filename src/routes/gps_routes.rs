use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::Value;

use crate::controllers::gps_log_controller::GpsLogController;
use crate::dto::MessageResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_gps_router() -> Router<AppState> {
    Router::new().route("/log", post(record_gps_log))
}

async fn record_gps_log(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(payload) = payload?;
    let controller = GpsLogController::new(&state);
    controller.record(payload).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Data saved successfully"))))
}

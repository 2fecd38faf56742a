use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::drive_controller::DriveController;
use crate::dto::drive_dto::{
    EndDriveResponse, LocationRequest, LocationUpdateResponse, SessionResponse, StartDriveRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_drive_router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_drive))
        .route("/active/all", get(list_active_drives))
        .route("/:id", get(get_drive))
        .route("/:id/location", post(submit_location))
        .route("/:id/checkpoint/:index/complete", patch(complete_checkpoint))
        .route("/:id/end", post(end_drive))
}

async fn start_drive(
    State(state): State<AppState>,
    payload: Result<Json<StartDriveRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let Json(request) = payload?;
    let controller = DriveController::new(&state);
    let response = controller.start(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn submit_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<LocationRequest>, JsonRejection>,
) -> Result<Json<LocationUpdateResponse>, AppError> {
    let Json(request) = payload?;
    let controller = DriveController::new(&state);
    Ok(Json(controller.submit_location(id, request).await?))
}

async fn complete_checkpoint(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<SessionResponse>, AppError> {
    let controller = DriveController::new(&state);
    Ok(Json(controller.complete_checkpoint(id, index).await?))
}

async fn end_drive(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EndDriveResponse>, AppError> {
    let controller = DriveController::new(&state);
    Ok(Json(controller.end(id).await?))
}

async fn get_drive(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let controller = DriveController::new(&state);
    Ok(Json(controller.get(id).await?))
}

async fn list_active_drives(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let controller = DriveController::new(&state);
    Ok(Json(controller.list_active().await?))
}

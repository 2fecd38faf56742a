use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::route_controller::RouteController;
use crate::dto::route_dto::CreateRouteRequest;
use crate::models::Route;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_route_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_routes).post(create_route))
        .route("/:id", get(get_route))
}

async fn create_route(
    State(state): State<AppState>,
    payload: Result<Json<CreateRouteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Route>), AppError> {
    let Json(request) = payload?;
    let controller = RouteController::new(&state);
    let route = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(route)))
}

async fn list_routes(State(state): State<AppState>) -> Result<Json<Vec<Route>>, AppError> {
    let controller = RouteController::new(&state);
    Ok(Json(controller.list().await?))
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Route>, AppError> {
    let controller = RouteController::new(&state);
    Ok(Json(controller.get_by_id(id).await?))
}

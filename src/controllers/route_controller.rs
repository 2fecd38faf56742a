use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::dto::route_dto::CreateRouteRequest;
use crate::models::{Route, RoutePoint};
use crate::repositories::RouteRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct RouteController {
    repository: Arc<dyn RouteRepository>,
}

impl RouteController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.routes.clone(),
        }
    }

    pub async fn create(&self, request: CreateRouteRequest) -> AppResult<Route> {
        request.validate_all()?;

        let points: Vec<RoutePoint> = request.points.into_iter().map(RoutePoint::from).collect();
        let route = Route::new(request.route_name.trim().to_string(), points);
        let route = self.repository.create(route).await?;

        info!("🗺️ Ruta '{}' registrada ({} puntos)", route.route_name, route.points.len());
        Ok(route)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Route> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AppError::RouteNotFound(id))
    }

    pub async fn list(&self) -> AppResult<Vec<Route>> {
        self.repository.list().await
    }
}

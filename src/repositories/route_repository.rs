use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Route, RoutePoint};
use crate::utils::errors::AppError;

/// Acceso a las rutas creadas desde el editor
#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn create(&self, route: Route) -> Result<Route, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Route>, AppError>;
    async fn list(&self) -> Result<Vec<Route>, AppError>;
}

#[derive(Debug, sqlx::FromRow)]
struct RouteRow {
    id: Uuid,
    route_name: String,
    points: Json<Vec<RoutePoint>>,
    created_at: DateTime<Utc>,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Self {
            id: row.id,
            route_name: row.route_name,
            points: row.points.0,
            created_at: row.created_at,
        }
    }
}

pub struct PgRouteRepository {
    pool: PgPool,
}

impl PgRouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RouteRepository for PgRouteRepository {
    async fn create(&self, route: Route) -> Result<Route, AppError> {
        let row = sqlx::query_as::<_, RouteRow>(
            r#"
            INSERT INTO routes (id, route_name, points, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, route_name, points, created_at
            "#,
        )
        .bind(route.id)
        .bind(&route.route_name)
        .bind(Json(&route.points))
        .bind(route.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Route>, AppError> {
        let row = sqlx::query_as::<_, RouteRow>(
            "SELECT id, route_name, points, created_at FROM routes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Route::from))
    }

    async fn list(&self) -> Result<Vec<Route>, AppError> {
        let rows = sqlx::query_as::<_, RouteRow>(
            "SELECT id, route_name, points, created_at FROM routes ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Route::from).collect())
    }
}

/// Implementación en memoria (desarrollo sin DATABASE_URL y tests)
#[derive(Clone, Default)]
pub struct InMemoryRouteRepository {
    routes: Arc<RwLock<HashMap<Uuid, Route>>>,
}

impl InMemoryRouteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RouteRepository for InMemoryRouteRepository {
    async fn create(&self, route: Route) -> Result<Route, AppError> {
        let mut routes = self.routes.write().await;
        if routes.contains_key(&route.id) {
            return Err(AppError::Conflict(format!("Route '{}' already exists", route.id)));
        }
        routes.insert(route.id, route.clone());
        Ok(route)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Route>, AppError> {
        Ok(self.routes.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Route>, AppError> {
        let mut routes: Vec<Route> = self.routes.read().await.values().cloned().collect();
        routes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(routes)
    }
}

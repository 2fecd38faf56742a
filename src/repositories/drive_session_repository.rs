use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Checkpoint, DriveSession, GeoPoint, RouteSnapshot, SessionSettings, SessionStatus};
use crate::utils::errors::AppError;

/// Persistencia de sesiones de conducción.
///
/// `update` usa concurrencia optimista: sólo escribe si la versión guardada
/// coincide con `session.version`, y devuelve la sesión con la versión nueva.
#[async_trait]
pub trait DriveSessionRepository: Send + Sync {
    async fn insert(&self, session: &DriveSession) -> Result<(), AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DriveSession>, AppError>;
    async fn update(&self, session: &DriveSession) -> Result<DriveSession, AppError>;
    async fn list_running(&self) -> Result<Vec<DriveSession>, AppError>;
}

fn stale_version(session: &DriveSession) -> AppError {
    AppError::Conflict(format!(
        "Drive session '{}' was modified concurrently (expected version {})",
        session.id, session.version
    ))
}

#[derive(Debug, sqlx::FromRow)]
struct DriveSessionRow {
    id: Uuid,
    route_snapshot: Json<RouteSnapshot>,
    status: String,
    settings: Json<SessionSettings>,
    current_location: Option<Json<GeoPoint>>,
    previous_location: Option<Json<GeoPoint>>,
    checkpoints: Json<Vec<Checkpoint>>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    version: i64,
}

impl TryFrom<DriveSessionRow> for DriveSession {
    type Error = AppError;

    fn try_from(row: DriveSessionRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<SessionStatus>()
            .map_err(|e| AppError::Internal(format!("drive session {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            route: row.route_snapshot.0,
            status,
            settings: row.settings.0,
            current_location: row.current_location.map(|l| l.0),
            previous_location: row.previous_location.map(|l| l.0),
            checkpoints: row.checkpoints.0,
            start_time: row.start_time,
            end_time: row.end_time,
            version: row.version,
        })
    }
}

const SESSION_COLUMNS: &str = "id, route_snapshot, status, settings, current_location, \
     previous_location, checkpoints, start_time, end_time, version";

pub struct PgDriveSessionRepository {
    pool: PgPool,
}

impl PgDriveSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriveSessionRepository for PgDriveSessionRepository {
    async fn insert(&self, session: &DriveSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO drive_sessions (id, route_id, route_snapshot, status, settings,
                current_location, previous_location, checkpoints, start_time, end_time, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(session.id)
        .bind(session.route_id())
        .bind(Json(&session.route))
        .bind(session.status.as_str())
        .bind(Json(&session.settings))
        .bind(session.current_location.map(Json))
        .bind(session.previous_location.map(Json))
        .bind(Json(&session.checkpoints))
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DriveSession>, AppError> {
        let query = format!("SELECT {} FROM drive_sessions WHERE id = $1", SESSION_COLUMNS);
        let row = sqlx::query_as::<_, DriveSessionRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(DriveSession::try_from).transpose()
    }

    async fn update(&self, session: &DriveSession) -> Result<DriveSession, AppError> {
        // Los campos congelados (ruta y settings) nunca se reescriben
        let query = format!(
            r#"
            UPDATE drive_sessions
            SET status = $2, current_location = $3, previous_location = $4,
                checkpoints = $5, start_time = $6, end_time = $7, version = version + 1
            WHERE id = $1 AND version = $8
            RETURNING {}
            "#,
            SESSION_COLUMNS
        );
        let row = sqlx::query_as::<_, DriveSessionRow>(&query)
            .bind(session.id)
            .bind(session.status.as_str())
            .bind(session.current_location.map(Json))
            .bind(session.previous_location.map(Json))
            .bind(Json(&session.checkpoints))
            .bind(session.start_time)
            .bind(session.end_time)
            .bind(session.version)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => DriveSession::try_from(row),
            None => Err(stale_version(session)),
        }
    }

    async fn list_running(&self) -> Result<Vec<DriveSession>, AppError> {
        let query = format!(
            "SELECT {} FROM drive_sessions WHERE status = 'running' ORDER BY start_time DESC",
            SESSION_COLUMNS
        );
        let rows = sqlx::query_as::<_, DriveSessionRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(DriveSession::try_from).collect()
    }
}

/// Implementación en memoria (desarrollo sin DATABASE_URL y tests)
#[derive(Clone, Default)]
pub struct InMemoryDriveSessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, DriveSession>>>,
}

impl InMemoryDriveSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DriveSessionRepository for InMemoryDriveSessionRepository {
    async fn insert(&self, session: &DriveSession) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(AppError::Conflict(format!(
                "Drive session '{}' already exists",
                session.id
            )));
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DriveSession>, AppError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn update(&self, session: &DriveSession) -> Result<DriveSession, AppError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(&session.id)
            .ok_or(AppError::SessionNotFound(session.id))?;
        if stored.version != session.version {
            return Err(stale_version(session));
        }

        let mut updated = session.clone();
        updated.version += 1;
        // Igual que en PostgreSQL: ruta y settings no se reescriben
        updated.route = stored.route.clone();
        updated.settings = stored.settings;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn list_running(&self) -> Result<Vec<DriveSession>, AppError> {
        let mut running: Vec<DriveSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_running())
            .cloned()
            .collect();
        running.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(running)
    }
}

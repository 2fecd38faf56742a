//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    DriveSessionRepository, GpsLogRepository, InMemoryDriveSessionRepository,
    InMemoryGpsLogRepository, InMemoryRouteRepository, PgDriveSessionRepository,
    PgGpsLogRepository, PgRouteRepository, RouteRepository,
};
use crate::services::session_locks::SessionLocks;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub routes: Arc<dyn RouteRepository>,
    pub sessions: Arc<dyn DriveSessionRepository>,
    pub gps_logs: Arc<dyn GpsLogRepository>,
    pub session_locks: SessionLocks,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        routes: Arc<dyn RouteRepository>,
        sessions: Arc<dyn DriveSessionRepository>,
        gps_logs: Arc<dyn GpsLogRepository>,
    ) -> Self {
        Self {
            config,
            routes,
            sessions,
            gps_logs,
            session_locks: SessionLocks::new(),
        }
    }

    /// Estado respaldado por PostgreSQL
    pub fn with_postgres(config: EnvironmentConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgRouteRepository::new(pool.clone())),
            Arc::new(PgDriveSessionRepository::new(pool.clone())),
            Arc::new(PgGpsLogRepository::new(pool)),
        )
    }

    /// Estado en memoria (desarrollo y tests)
    pub fn in_memory(config: EnvironmentConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryRouteRepository::new()),
            Arc::new(InMemoryDriveSessionRepository::new()),
            Arc::new(InMemoryGpsLogRepository::new()),
        )
    }
}

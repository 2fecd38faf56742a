//! Repositorios
//!
//! Cada repositorio expone un trait con una implementación PostgreSQL (sqlx)
//! y otra en memoria.

pub mod drive_session_repository;
pub mod gps_log_repository;
pub mod route_repository;

pub use drive_session_repository::{
    DriveSessionRepository, InMemoryDriveSessionRepository, PgDriveSessionRepository,
};
pub use gps_log_repository::{GpsLogRepository, InMemoryGpsLogRepository, PgGpsLogRepository};
pub use route_repository::{InMemoryRouteRepository, PgRouteRepository, RouteRepository};

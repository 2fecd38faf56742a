//! Servicio de sesiones de conducción
//!
//! Ciclo de vida de una sesión: inicio, envío de ubicaciones, completado
//! manual y fin. Cada operación que muta una sesión se ejecuta bajo el lock
//! de esa sesión y trabaja sobre una copia: si la persistencia falla, la
//! transición calculada se descarta por completo.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::environment::TrackingConfig;
use crate::models::{DriveSession, GeoPoint, SessionSettings};
use crate::repositories::{DriveSessionRepository, RouteRepository};
use crate::services::checkpoint_engine::{self, SampleOutcome};
use crate::services::session_locks::SessionLocks;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::validate_radius;

/// Sesión guardada junto con el resultado de procesar la muestra
#[derive(Debug, Clone)]
pub struct LocationUpdate {
    pub session: DriveSession,
    pub outcome: SampleOutcome,
}

pub struct DriveService {
    routes: Arc<dyn RouteRepository>,
    sessions: Arc<dyn DriveSessionRepository>,
    locks: SessionLocks,
    tracking: TrackingConfig,
}

impl DriveService {
    pub fn new(state: &AppState) -> Self {
        Self {
            routes: state.routes.clone(),
            sessions: state.sessions.clone(),
            locks: state.session_locks.clone(),
            tracking: state.config.tracking.clone(),
        }
    }

    /// Iniciar una sesión sobre una ruta existente
    pub async fn start(
        &self,
        route_id: Uuid,
        approach_radius: Option<f64>,
        arrival_radius: Option<f64>,
    ) -> AppResult<DriveSession> {
        let settings = SessionSettings::from_tracking(&self.tracking, approach_radius, arrival_radius);
        validate_radius("approachRadius", settings.approach_radius)?;
        validate_radius("arrivalRadius", settings.arrival_radius)?;
        if settings.arrival_radius > settings.approach_radius {
            return Err(AppError::InvalidInput(format!(
                "arrivalRadius ({} km) must not exceed approachRadius ({} km)",
                settings.arrival_radius, settings.approach_radius
            )));
        }

        let route = self
            .routes
            .find_by_id(route_id)
            .await?
            .ok_or(AppError::RouteNotFound(route_id))?;
        if route.points.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Route '{}' has no points to track",
                route_id
            )));
        }

        let session = DriveSession::start(&route, settings, Utc::now());
        self.sessions.insert(&session).await?;

        info!(
            "🚌 Sesión {} iniciada en ruta '{}' ({} checkpoints, aproximación {} km, llegada {} km)",
            session.id,
            route.route_name,
            session.checkpoints.len(),
            settings.approach_radius,
            settings.arrival_radius
        );
        Ok(session)
    }

    /// Procesar una ubicación y persistir el resultado
    pub async fn submit_location(&self, session_id: Uuid, sample: GeoPoint) -> AppResult<LocationUpdate> {
        let guard = self.locks.acquire(session_id).await;
        let result = self.submit_locked(session_id, sample).await;
        self.unlock(session_id, guard).await;
        result
    }

    /// Completado manual: fuerza `arrived` en los checkpoints 0..=index sin resolver
    pub async fn complete(&self, session_id: Uuid, index: usize) -> AppResult<DriveSession> {
        let guard = self.locks.acquire(session_id).await;
        let result = self.complete_locked(session_id, index).await;
        self.unlock(session_id, guard).await;
        result
    }

    /// Terminar una sesión. Terminar una sesión ya completada no cambia nada.
    pub async fn end(&self, session_id: Uuid) -> AppResult<DriveSession> {
        let guard = self.locks.acquire(session_id).await;
        let result = self.end_locked(session_id).await;
        self.unlock(session_id, guard).await;
        result
    }

    /// Consultar una sesión (en curso o terminada)
    pub async fn get(&self, session_id: Uuid) -> AppResult<DriveSession> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .ok_or(AppError::SessionNotFound(session_id))
    }

    pub async fn list_active(&self) -> AppResult<Vec<DriveSession>> {
        self.sessions.list_running().await
    }

    async fn submit_locked(&self, session_id: Uuid, sample: GeoPoint) -> AppResult<LocationUpdate> {
        let mut session = self.load_running(session_id).await?;

        let outcome = checkpoint_engine::process_sample(&mut session, sample, Utc::now());
        let session = self.persist(session).await?;

        Ok(LocationUpdate { session, outcome })
    }

    async fn complete_locked(&self, session_id: Uuid, index: usize) -> AppResult<DriveSession> {
        let mut session = self.load_running(session_id).await?;

        if index >= session.checkpoints.len() {
            return Err(AppError::CheckpointNotFound { session_id, index });
        }

        let changed = session.complete_through(index, Utc::now());
        if changed.is_empty() {
            info!("✋ Sesión {}: checkpoints 0..={} ya resueltos", session_id, index);
            return Ok(session);
        }

        info!("✋ Sesión {}: completado manual de checkpoints {:?}", session_id, changed);
        self.persist(session).await
    }

    async fn end_locked(&self, session_id: Uuid) -> AppResult<DriveSession> {
        let mut session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(AppError::SessionNotFound(session_id))?;

        if !session.is_running() {
            warn!("⚠️ Sesión {} ya estaba terminada", session_id);
            return Ok(session);
        }

        session.finish(Utc::now());
        let session = self.persist(session).await?;

        info!("🏁 Sesión {} terminada", session_id);
        Ok(session)
    }

    // Soltar el guard antes de limpiar: con el guard vivo la entrada nunca está libre
    async fn unlock(&self, session_id: Uuid, guard: OwnedMutexGuard<()>) {
        drop(guard);
        self.locks.evict_idle(session_id).await;
    }

    async fn load_running(&self, session_id: Uuid) -> AppResult<DriveSession> {
        match self.sessions.find_by_id(session_id).await? {
            Some(session) if session.is_running() => Ok(session),
            _ => Err(AppError::SessionNotFound(session_id)),
        }
    }

    async fn persist(&self, session: DriveSession) -> AppResult<DriveSession> {
        let session_id = session.id;
        self.sessions.update(&session).await.map_err(|e| {
            error!("💾 Sesión {}: no se pudo guardar, cambio descartado: {}", session_id, e);
            AppError::Persistence(format!("drive session {}: {}", session_id, e))
        })
    }
}

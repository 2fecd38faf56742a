//! Modelo de DriveSession
//!
//! Una sesión de conducción es el agregado que el motor de progresión muta:
//! contiene la copia congelada de la ruta, la configuración capturada al
//! inicio, las dos últimas ubicaciones y un checkpoint por punto de la ruta.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::location::GeoPoint;
use super::route::{Route, RouteSnapshot};
use crate::config::environment::TrackingConfig;

/// Estado de la sesión
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "running" => Ok(SessionStatus::Running),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("unknown session status '{}'", other)),
        }
    }
}

/// Estado de un checkpoint. El orden de las variantes es el orden de progresión.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointStatus {
    Pending,
    Approaching,
    Arrived,
    Departed,
}

/// Progreso del vehículo respecto a un punto de la ruta
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub point_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    pub status: CheckpointStatus,
    #[serde(default)]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,
    /// Distancia mínima observada (km) mientras no estaba `departed`
    #[serde(default)]
    pub min_distance: Option<f64>,
}

impl Checkpoint {
    pub fn pending(point_name: String, scheduled_time: Option<String>) -> Self {
        Self {
            point_name,
            scheduled_time,
            status: CheckpointStatus::Pending,
            arrival_time: None,
            departure_time: None,
            min_distance: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status >= CheckpointStatus::Arrived
    }

    /// Avanzar de estado. Devuelve `false` (sin tocar nada) si el cambio
    /// retrocedería o no avanzaría el estado actual.
    pub fn advance(&mut self, next: CheckpointStatus) -> bool {
        if next <= self.status {
            return false;
        }
        self.status = next;
        true
    }

    /// Los tiempos se fijan una sola vez
    pub fn mark_arrival(&mut self, now: DateTime<Utc>) {
        self.arrival_time.get_or_insert(now);
    }

    pub fn mark_departure(&mut self, now: DateTime<Utc>) {
        self.departure_time.get_or_insert(now);
    }

    pub fn observe_distance(&mut self, distance_km: f64) {
        match self.min_distance {
            Some(current) if current <= distance_km => {}
            _ => self.min_distance = Some(distance_km),
        }
    }
}

fn default_hysteresis_factor() -> f64 {
    crate::config::environment::DEFAULT_HYSTERESIS_FACTOR
}

fn default_direction_threshold() -> f64 {
    crate::config::environment::DEFAULT_DIRECTION_THRESHOLD
}

/// Configuración capturada al iniciar la sesión (radios en km)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    pub approach_radius: f64,
    pub arrival_radius: f64,
    #[serde(default = "default_hysteresis_factor")]
    pub hysteresis_factor: f64,
    #[serde(default = "default_direction_threshold")]
    pub direction_threshold: f64,
}

impl SessionSettings {
    pub fn from_tracking(
        tracking: &TrackingConfig,
        approach_radius: Option<f64>,
        arrival_radius: Option<f64>,
    ) -> Self {
        Self {
            approach_radius: approach_radius.unwrap_or(tracking.approach_radius_km),
            arrival_radius: arrival_radius.unwrap_or(tracking.arrival_radius_km),
            hysteresis_factor: tracking.hysteresis_factor,
            direction_threshold: tracking.direction_threshold,
        }
    }

    /// Distancia a partir de la cual un checkpoint `arrived` pasa a `departed`
    pub fn departure_radius(&self) -> f64 {
        self.arrival_radius * self.hysteresis_factor
    }
}

/// Sesión de conducción
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveSession {
    pub id: Uuid,
    pub route: RouteSnapshot,
    pub status: SessionStatus,
    pub settings: SessionSettings,
    pub current_location: Option<GeoPoint>,
    pub previous_location: Option<GeoPoint>,
    pub checkpoints: Vec<Checkpoint>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Versión para concurrencia optimista en la persistencia
    pub version: i64,
}

impl DriveSession {
    /// Crear una sesión nueva con todos los checkpoints en `pending`
    pub fn start(route: &Route, settings: SessionSettings, now: DateTime<Utc>) -> Self {
        let route = RouteSnapshot::capture(route, now);
        let checkpoints = route
            .points
            .iter()
            .map(|p| Checkpoint::pending(p.name.clone(), p.scheduled_time.clone()))
            .collect();

        Self {
            id: Uuid::new_v4(),
            route,
            status: SessionStatus::Running,
            settings,
            current_location: None,
            previous_location: None,
            checkpoints,
            start_time: now,
            end_time: None,
            version: 0,
        }
    }

    pub fn route_id(&self) -> Uuid {
        self.route.route_id
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Registrar una muestra: la actual pasa a ser la anterior
    pub fn record_location(&mut self, sample: GeoPoint) {
        self.previous_location = self.current_location.replace(sample);
    }

    /// Forzar `arrived` en los checkpoints 0..=index que aún no estén resueltos.
    /// Devuelve los índices modificados.
    pub fn complete_through(&mut self, index: usize, now: DateTime<Utc>) -> Vec<usize> {
        let mut changed = Vec::new();
        for (i, checkpoint) in self.checkpoints.iter_mut().enumerate().take(index + 1) {
            if checkpoint.is_resolved() {
                continue;
            }
            checkpoint.advance(CheckpointStatus::Arrived);
            checkpoint.mark_arrival(now);
            changed.push(i);
        }
        changed
    }

    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Completed;
        self.end_time = Some(now);
    }
}

//! Modelo de Route
//!
//! Este módulo contiene el struct Route (ruta creada desde el editor)
//! y el `RouteSnapshot` inmutable que cada sesión de conducción captura al iniciar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::location::GeoPoint;

/// Tipo de punto - acepta también las etiquetas coreanas del editor de rutas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PointKind {
    #[serde(alias = "출발지")]
    Origin,
    #[serde(alias = "경유지")]
    Waypoint,
    #[serde(alias = "가상정류소")]
    VirtualStop,
    #[serde(alias = "도착지")]
    Destination,
}

/// Punto de una ruta (parada real o virtual)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub name: String,
    pub location: GeoPoint,
    #[serde(rename = "type")]
    pub kind: PointKind,
    /// Hora programada "HH:mm"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub use_announcement: bool,
}

/// Route principal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: Uuid,
    pub route_name: String,
    pub points: Vec<RoutePoint>,
    pub created_at: DateTime<Utc>,
}

impl Route {
    pub fn new(route_name: String, points: Vec<RoutePoint>) -> Self {
        Self {
            id: Uuid::new_v4(),
            route_name,
            points,
            created_at: Utc::now(),
        }
    }
}

/// Copia congelada de una ruta, tomada al iniciar una sesión.
///
/// Nunca se refresca: las ediciones posteriores de la ruta no afectan a
/// sesiones en curso.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSnapshot {
    pub route_id: Uuid,
    pub route_name: String,
    pub points: Vec<RoutePoint>,
    pub captured_at: DateTime<Utc>,
}

impl RouteSnapshot {
    pub fn capture(route: &Route, now: DateTime<Utc>) -> Self {
        Self {
            route_id: route.id,
            route_name: route.route_name.clone(),
            points: route.points.clone(),
            captured_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{GeoPoint, PointKind, RoutePoint};
use crate::utils::errors::AppResult;
use crate::utils::validation::{validate_not_empty, validate_schedule_time};

// Punto de ruta recibido desde el editor. `Serialize` lo pide la regla
// `length` de `CreateRouteRequest::points` para adjuntar el valor al error.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoutePointRequest {
    #[validate(custom = "validate_not_empty")]
    pub name: String,
    pub location: GeoPoint,
    #[serde(rename = "type")]
    pub kind: PointKind,
    #[validate(custom = "validate_schedule_time")]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub use_announcement: bool,
}

impl From<RoutePointRequest> for RoutePoint {
    fn from(request: RoutePointRequest) -> Self {
        RoutePoint {
            name: request.name.trim().to_string(),
            location: request.location,
            kind: request.kind,
            scheduled_time: request.scheduled_time.map(|t| t.trim().to_string()),
            use_announcement: request.use_announcement,
        }
    }
}

// Request para crear una ruta
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_empty")]
    pub route_name: String,
    #[validate(length(min = 1))]
    pub points: Vec<RoutePointRequest>,
}

impl CreateRouteRequest {
    /// Validar la ruta y cada uno de sus puntos
    pub fn validate_all(&self) -> AppResult<()> {
        self.validate()?;
        for point in &self.points {
            point.validate()?;
        }
        Ok(())
    }
}

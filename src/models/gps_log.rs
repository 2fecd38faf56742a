//! Registro crudo de GPS
//!
//! Los clientes envían sus fijaciones sin procesar para poder ajustar más
//! tarde los parámetros de seguimiento. No afecta a ninguna sesión.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsLogEntry {
    pub id: Uuid,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl GpsLogEntry {
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            received_at: Utc::now(),
        }
    }
}

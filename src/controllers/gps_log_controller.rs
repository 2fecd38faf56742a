use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::models::GpsLogEntry;
use crate::repositories::GpsLogRepository;
use crate::state::AppState;
use crate::utils::errors::{invalid_input_error, AppResult};

pub struct GpsLogController {
    repository: Arc<dyn GpsLogRepository>,
}

impl GpsLogController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.gps_logs.clone(),
        }
    }

    /// Guardar un registro GPS crudo. Solo se aceptan objetos JSON.
    pub async fn record(&self, payload: Value) -> AppResult<GpsLogEntry> {
        if !payload.is_object() {
            return Err(invalid_input_error("GPS log payload must be a JSON object"));
        }
        let entry = GpsLogEntry::new(payload);
        self.repository.insert(&entry).await?;
        debug!("🛰️ Registro GPS {} guardado", entry.id);
        Ok(entry)
    }
}

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Checkpoint, DriveSession, GeoPoint, RouteSnapshot, SessionSettings, SessionStatus};
use crate::services::schedule::adjusted_time;
use crate::services::LocationUpdate;

// Request para iniciar una sesión
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDriveRequest {
    pub route_id: Uuid,
    pub approach_radius: Option<f64>,
    pub arrival_radius: Option<f64>,
}

// Ubicación enviada por el conductor. Los campos se validan a mano para
// aceptar números o cadenas numéricas.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocationRequest {
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
}

// Checkpoint con la hora ajustada al inicio real
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointResponse {
    pub index: usize,
    #[serde(flatten)]
    pub checkpoint: Checkpoint,
    pub adjusted_time: Option<String>,
}

// Response de sesión
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub route_id: Uuid,
    pub route: RouteSnapshot,
    pub status: SessionStatus,
    pub settings: SessionSettings,
    pub current_location: Option<GeoPoint>,
    pub previous_location: Option<GeoPoint>,
    pub checkpoints: Vec<CheckpointResponse>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub version: i64,
}

impl SessionResponse {
    pub fn from_session(session: DriveSession, local_offset: FixedOffset) -> Self {
        let checkpoints = checkpoint_responses(&session.checkpoints, local_offset);
        Self {
            id: session.id,
            route_id: session.route_id(),
            route: session.route,
            status: session.status,
            settings: session.settings,
            current_location: session.current_location,
            previous_location: session.previous_location,
            checkpoints,
            start_time: session.start_time,
            end_time: session.end_time,
            version: session.version,
        }
    }
}

// Response de una ubicación procesada
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateResponse {
    pub status: SessionStatus,
    pub checkpoints: Vec<CheckpointResponse>,
    pub play_announcement: bool,
    pub message: String,
}

impl LocationUpdateResponse {
    pub fn from_update(update: LocationUpdate, local_offset: FixedOffset) -> Self {
        Self {
            status: update.session.status,
            checkpoints: checkpoint_responses(&update.session.checkpoints, local_offset),
            play_announcement: update.outcome.play_announcement,
            message: update.outcome.message,
        }
    }
}

// Response de fin de sesión
#[derive(Debug, Serialize)]
pub struct EndDriveResponse {
    pub message: String,
    pub session: SessionResponse,
}

/// Horas ajustadas tomando como base la llegada real al primer checkpoint
fn checkpoint_responses(checkpoints: &[Checkpoint], local_offset: FixedOffset) -> Vec<CheckpointResponse> {
    let base = checkpoints.first();
    let base_scheduled = base.and_then(|c| c.scheduled_time.clone());
    let actual_start = base.and_then(|c| c.arrival_time);

    checkpoints
        .iter()
        .enumerate()
        .map(|(index, checkpoint)| {
            let adjusted = checkpoint.scheduled_time.as_deref().map(|scheduled| match &base_scheduled {
                Some(base_scheduled) => adjusted_time(scheduled, base_scheduled, actual_start, local_offset),
                None => scheduled.to_string(),
            });
            CheckpointResponse {
                index,
                checkpoint: checkpoint.clone(),
                adjusted_time: adjusted,
            }
        })
        .collect()
}

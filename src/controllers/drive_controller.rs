use chrono::FixedOffset;
use uuid::Uuid;

use crate::dto::drive_dto::{
    EndDriveResponse, LocationRequest, LocationUpdateResponse, SessionResponse, StartDriveRequest,
};
use crate::services::schedule::local_offset;
use crate::services::DriveService;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::validation::parse_location;

const END_MESSAGE: &str = "운행 종료 성공";

pub struct DriveController {
    service: DriveService,
    local_offset: FixedOffset,
}

impl DriveController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: DriveService::new(state),
            local_offset: local_offset(state.config.tracking.schedule_utc_offset_minutes),
        }
    }

    pub async fn start(&self, request: StartDriveRequest) -> AppResult<SessionResponse> {
        let session = self
            .service
            .start(request.route_id, request.approach_radius, request.arrival_radius)
            .await?;
        Ok(SessionResponse::from_session(session, self.local_offset))
    }

    pub async fn submit_location(
        &self,
        session_id: Uuid,
        request: LocationRequest,
    ) -> AppResult<LocationUpdateResponse> {
        // Validar antes de tocar la sesión
        let sample = parse_location(request.latitude.as_ref(), request.longitude.as_ref())?;
        let update = self.service.submit_location(session_id, sample).await?;
        Ok(LocationUpdateResponse::from_update(update, self.local_offset))
    }

    pub async fn complete_checkpoint(&self, session_id: Uuid, index: usize) -> AppResult<SessionResponse> {
        let session = self.service.complete(session_id, index).await?;
        Ok(SessionResponse::from_session(session, self.local_offset))
    }

    pub async fn end(&self, session_id: Uuid) -> AppResult<EndDriveResponse> {
        let session = self.service.end(session_id).await?;
        Ok(EndDriveResponse {
            message: END_MESSAGE.to_string(),
            session: SessionResponse::from_session(session, self.local_offset),
        })
    }

    pub async fn get(&self, session_id: Uuid) -> AppResult<SessionResponse> {
        let session = self.service.get(session_id).await?;
        Ok(SessionResponse::from_session(session, self.local_offset))
    }

    pub async fn list_active(&self) -> AppResult<Vec<SessionResponse>> {
        let sessions = self.service.list_active().await?;
        Ok(sessions
            .into_iter()
            .map(|s| SessionResponse::from_session(s, self.local_offset))
            .collect())
    }
}

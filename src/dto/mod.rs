//! DTOs de la API
//!
//! Requests y responses en JSON camelCase.

pub mod drive_dto;
pub mod route_dto;

use serde::Serialize;

// Respuesta simple con mensaje
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

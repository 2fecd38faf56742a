//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del servidor de seguimiento
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Route not found: {0}")]
    RouteNotFound(Uuid),

    #[error("Drive session not found or already completed: {0}")]
    SessionNotFound(Uuid),

    #[error("Checkpoint {index} not found in drive session {session_id}")]
    CheckpointNotFound { session_id: Uuid, index: usize },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    /// Código HTTP asociado a cada error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::RouteNotFound(_)
            | AppError::SessionNotFound(_)
            | AppError::CheckpointNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Persistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match self {
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                ErrorResponse {
                    error: "Database Error".to_string(),
                    message: "An error occurred while accessing the database".to_string(),
                    details: Some(json!({ "sql_error": e.to_string() })),
                    code: Some("DB_ERROR".to_string()),
                }
            }

            AppError::Validation(e) => {
                warn!("⚠️ Validation error: {}", e);
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: "The provided data is invalid".to_string(),
                    details: Some(json!(e)),
                    code: Some("VALIDATION_ERROR".to_string()),
                }
            }

            AppError::InvalidInput(msg) => {
                warn!("⚠️ Invalid input: {}", msg);
                ErrorResponse {
                    error: "Invalid Input".to_string(),
                    message: msg,
                    details: None,
                    code: Some("INVALID_INPUT".to_string()),
                }
            }

            AppError::RouteNotFound(route_id) => {
                warn!("🔍 Route not found: {}", route_id);
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: format!("Route with id '{}' not found", route_id),
                    details: Some(json!({ "route_id": route_id })),
                    code: Some("ROUTE_NOT_FOUND".to_string()),
                }
            }

            AppError::SessionNotFound(session_id) => {
                warn!("🔍 Drive session not found or completed: {}", session_id);
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: format!(
                        "No running drive session with id '{}'",
                        session_id
                    ),
                    details: Some(json!({ "session_id": session_id })),
                    code: Some("SESSION_NOT_FOUND".to_string()),
                }
            }

            AppError::CheckpointNotFound { session_id, index } => {
                warn!("🔍 Checkpoint {} not found in session {}", index, session_id);
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: format!(
                        "Checkpoint {} does not exist in drive session '{}'",
                        index, session_id
                    ),
                    details: Some(json!({ "session_id": session_id, "index": index })),
                    code: Some("CHECKPOINT_NOT_FOUND".to_string()),
                }
            }

            AppError::Conflict(msg) => {
                warn!("⚠️ Conflict: {}", msg);
                ErrorResponse {
                    error: "Conflict".to_string(),
                    message: msg,
                    details: None,
                    code: Some("CONFLICT".to_string()),
                }
            }

            AppError::Persistence(msg) => {
                error!("💾 Persistence failure: {}", msg);
                ErrorResponse {
                    error: "Persistence Failure".to_string(),
                    message: "The update could not be stored and was discarded".to_string(),
                    details: Some(json!({ "persistence_error": msg })),
                    code: Some("PERSISTENCE_FAILURE".to_string()),
                }
            }

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                    details: Some(json!({ "internal_error": msg })),
                    code: Some("INTERNAL_ERROR".to_string()),
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de entrada inválida
pub fn invalid_input_error(message: impl Into<String>) -> AppError {
    AppError::InvalidInput(message.into())
}

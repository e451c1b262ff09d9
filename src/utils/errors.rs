//! Sistema de manejo de errores
//!
//! Este módulo define la taxonomía de errores del motor y su conversión a
//! respuestas HTTP para la superficie de inspección. Ningún error aquí es
//! fatal para el proceso: la entrada mala de una sesión nunca tumba el motor.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::scooter::ScooterId;

/// Errores del motor de sesiones
#[derive(Error, Debug)]
pub enum EngineError {
    /// Comando para un id sin sesión y sin join previo. Recuperable: se
    /// reporta al llamador, nunca se difunde.
    #[error("unknown scooter '{0}'")]
    UnknownScooter(ScooterId),

    /// El worker de la sesión ya terminó (expulsada del registro)
    #[error("session closed for scooter '{0}'")]
    SessionClosed(ScooterId),

    /// Evento entrante que no se pudo interpretar
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Payload que no pasó la validación (p. ej. email inválido en el join)
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl EngineError {
    /// Código estable para el evento `error` del protocolo
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::UnknownScooter(_) => "UNKNOWN_SCOOTER",
            EngineError::SessionClosed(_) => "SESSION_CLOSED",
            EngineError::MalformedEvent(_) => "MALFORMED_EVENT",
            EngineError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

/// Errores de la superficie HTTP
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownScooter(id) => {
                AppError::NotFound(format!("Scooter '{}' no registrado", id))
            }
            EngineError::SessionClosed(id) => {
                AppError::Internal(format!("La sesión del scooter '{}' ya terminó", id))
            }
            EngineError::MalformedEvent(msg) => AppError::BadRequest(msg),
            EngineError::Validation(errors) => AppError::BadRequest(errors.to_string()),
        }
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: msg,
                    code: Some("NOT_FOUND".to_string()),
                },
            ),

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: msg,
                    code: Some("BAD_REQUEST".to_string()),
                },
            ),

            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                    code: Some(msg),
                },
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

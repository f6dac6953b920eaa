//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP `{success: false, message}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::trip_state_machine::TransitionError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    Transition(#[from] TransitionError),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Cuerpo de error de la API
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

impl AppError {
    /// Código HTTP asociado a cada variante
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(e) => match database_error_kind(e) {
                DbErrorKind::UniqueViolation | DbErrorKind::ForeignKeyViolation => {
                    StatusCode::CONFLICT
                }
                DbErrorKind::RowNotFound => StatusCode::NOT_FOUND,
                DbErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Transition(TransitionError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            AppError::Transition(_) => StatusCode::BAD_REQUEST,
            AppError::Hash(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensaje visible para el cliente; nunca incluye detalles internos
    pub fn client_message(&self) -> String {
        match self {
            AppError::Database(e) => match database_error_kind(e) {
                DbErrorKind::UniqueViolation => "El registro ya existe".to_string(),
                DbErrorKind::ForeignKeyViolation => {
                    "El registro está referenciado por otros datos".to_string()
                }
                DbErrorKind::RowNotFound => "Registro no encontrado".to_string(),
                DbErrorKind::Other => {
                    "Ocurrió un error al acceder a la base de datos".to_string()
                }
            },
            AppError::Validation(e) => format!("Datos inválidos: {}", e),
            AppError::BadRequest(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Transition(e) => e.to_string(),
            AppError::Hash(_) => "Error procesando las credenciales".to_string(),
            AppError::Internal(_) => "Ocurrió un error inesperado".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("❌ {}", self);
        } else {
            warn!("⚠️ Solicitud rechazada ({}): {}", status.as_u16(), self);
        }

        let body = ErrorResponse {
            success: false,
            message: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, PartialEq)]
enum DbErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    RowNotFound,
    Other,
}

fn database_error_kind(e: &sqlx::Error) -> DbErrorKind {
    match e {
        sqlx::Error::RowNotFound => DbErrorKind::RowNotFound,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => DbErrorKind::UniqueViolation,
            Some("23503") => DbErrorKind::ForeignKeyViolation,
            _ => DbErrorKind::Other,
        },
        _ => DbErrorKind::Other,
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str) -> AppError {
    AppError::NotFound(format!("No se encontró {}", resource))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str) -> AppError {
    AppError::Forbidden(format!("No tienes permiso para {}", operation))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::TripStatus;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = AppError::NotFound("No se encontró el viaje".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "No se encontró el viaje");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = AppError::Internal("pool timed out at 10.0.0.3".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert!(!body["message"].as_str().unwrap().contains("10.0.0.3"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Unauthenticated("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_transition_errors_mapping() {
        let invalid = AppError::from(TransitionError::InvalidTransition {
            from: TripStatus::New,
            to: TripStatus::PickedUp,
        });
        assert_eq!(invalid.status_code(), StatusCode::CONFLICT);

        let missing = AppError::from(TransitionError::MissingActualPrice);
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
    }
}

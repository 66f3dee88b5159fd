//! # Manejo de errores con thiserror
//!
//! Todos los handlers devuelven [`AppResult`]. Cada variante de [`AppError`]
//! se traduce a un código HTTP en [`ResponseError::error_response`], que
//! además deja constancia en el log.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use thiserror::Error;

/// Mensajes de validación agrupados por campo
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Tipos de error de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    /// Error de base de datos con la operación que lo provocó
    #[error("Error de base de datos en operación '{operation}': {source}")]
    Database {
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    /// Uno o varios campos del cuerpo no son válidos
    #[error("Error de validación en campos {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    Fields(FieldErrors),

    /// Error de validación general (JSON mal formado, tipos incorrectos...)
    #[error("Error de validación: {0}")]
    Validation(String),

    /// Error de autorización en un grupo de rutas protegido
    #[error("No autorizado para operación '{operation}': {reason}")]
    UnauthorizedWithContext {
        operation: String,
        reason: String,
    },

    /// Error de autorización simple
    #[error("No autorizado: {0}")]
    Unauthorized(String),

    /// Error de recurso no encontrado
    #[error("No encontrado: {resource_type} con ID '{id}'")]
    NotFoundWithId {
        resource_type: String,
        id: String,
    },

    /// Error de no encontrado simple
    #[error("No encontrado: {0}")]
    NotFound(String),

    /// Error de conflicto
    #[error("Conflicto: {0}")]
    Conflict(String),

    /// Error interno simple
    #[error("Error interno: {0}")]
    Internal(String),
}

impl AppError {
    /// Crea un error de base de datos con contexto de operación
    pub fn database(operation: &str, source: sqlx::Error) -> Self {
        Self::Database {
            operation: operation.to_string(),
            source,
        }
    }

    /// Crea un error de autorización con contexto
    pub fn unauthorized_operation(operation: &str, reason: &str) -> Self {
        Self::UnauthorizedWithContext {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Crea un error de no encontrado con ID
    pub fn not_found_id(resource_type: &str, id: impl ToString) -> Self {
        Self::NotFoundWithId {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Fields(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UnauthorizedWithContext { .. } | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFoundWithId { .. } | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Database { operation, source } => {
                let trace_id = uuid::Uuid::new_v4().to_string();
                tracing::error!(
                    trace_id = %trace_id,
                    operation = %operation,
                    error = %source,
                    error_chain = ?source.source(),
                    "Database error occurred"
                );
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Error de base de datos".to_string(),
                    message: format!("Error interno del servidor (trace: {})", trace_id),
                    fields: None,
                })
            }
            Self::Fields(fields) => {
                tracing::warn!(fields = ?fields, "Validation error");
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Error de validación".to_string(),
                    message: self.to_string(),
                    fields: Some(fields.clone()),
                })
            }
            Self::Validation(message) => {
                tracing::warn!(message = %message, "Validation error");
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Error de validación".to_string(),
                    message: message.clone(),
                    fields: None,
                })
            }
            Self::UnauthorizedWithContext { operation, reason } => {
                tracing::warn!(
                    operation = %operation,
                    reason = %reason,
                    "Unauthorized access attempt"
                );
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "No autorizado".to_string(),
                    message: format!("Operación '{}': {}", operation, reason),
                    fields: None,
                })
            }
            Self::Unauthorized(reason) => {
                tracing::warn!(reason = %reason, "Unauthorized access attempt");
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "No autorizado".to_string(),
                    message: reason.clone(),
                    fields: None,
                })
            }
            // 404 siempre con cuerpo vacío
            Self::NotFoundWithId { resource_type, id } => {
                tracing::info!(
                    resource_type = %resource_type,
                    id = %id,
                    "Resource not found"
                );
                HttpResponse::NotFound().finish()
            }
            Self::NotFound(what) => {
                tracing::info!(what = %what, "Resource not found");
                HttpResponse::NotFound().finish()
            }
            Self::Conflict(message) => {
                tracing::warn!(message = %message, "Conflict");
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Conflicto".to_string(),
                    message: message.clone(),
                    fields: None,
                })
            }
            Self::Internal(message) => {
                tracing::error!(message = %message, "Internal error");
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Error interno".to_string(),
                    message: "Error interno del servidor".to_string(),
                    fields: None,
                })
            }
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

pub type AppResult<T> = Result<T, AppError>;

// Conversión automática desde sqlx::Error
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database {
            operation: "database_operation".to_string(),
            source: error,
        }
    }
}

// Un mensaje por regla incumplida; si la regla no define mensaje se usa su código
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let messages = fields.entry(field.to_string()).or_default();
            for error in field_errors.iter() {
                match &error.message {
                    Some(message) => messages.push(message.to_string()),
                    None => messages.push(error.code.to_string()),
                }
            }
        }
        Self::Fields(fields)
    }
}

pub trait ResultExt<T> {
    fn map_err_validation(self, message: &str) -> AppResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + 'static,
{
    fn map_err_validation(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Validation(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn not_found_has_empty_body() {
        let response = AppError::not_found_id("Guest", 7).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body()).await.unwrap();
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn field_errors_are_listed_per_field() {
        let mut fields = FieldErrors::new();
        fields.insert("name".to_string(), vec!["Este campo es obligatorio.".to_string()]);
        let response = AppError::Fields(fields).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["fields"]["name"][0], "Este campo es obligatorio.");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::unauthorized_operation("guests", "x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::database("list", sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn map_err_validation_keeps_the_cause() {
        let parsed: Result<i64, _> = "abc".parse::<i64>();
        let err = parsed.map_err_validation("Número inválido").unwrap_err();
        assert!(err.to_string().starts_with("Error de validación: Número inválido"));
    }
}

//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas. La lógica de dominio
//! nunca loggea y relanza: falla con un error tipado y el renderizado
//! aquí es el único punto que loggea y arma el envelope.

use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

static PRODUCTION_MODE: OnceLock<bool> = OnceLock::new();

/// Fijar el modo de ejecución desde la configuración. La primera
/// llamada gana; el renderizado de errores lee este flag y no vuelve
/// a consultar el entorno.
pub fn set_production_mode(production: bool) {
    let _ = PRODUCTION_MODE.set(production);
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Rate limit exceeded, retry in {0}s")]
    RateLimited(u64),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "error": msg }),
            ),

            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                json!({ "success": false, "error": msg }),
            ),

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "error": msg }),
            ),

            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": collect_messages(&errors).join(", "),
                    "details": errors,
                }),
            ),

            AppError::Duplicate(field) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": format!("El {} ya existe", field) }),
            ),

            AppError::RateLimited(retry_after) => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "success": false,
                    "error": "Demasiadas solicitudes, por favor intenta de nuevo más tarde",
                    "retryAfter": retry_after,
                }),
            ),

            AppError::Internal(detail) => {
                // El detalle completo siempre se loggea (dentro del span del
                // request, así lleva el correlation id); al cliente solo se
                // expone fuera de producción.
                tracing::error!(detail = %detail, "Error interno del servidor");
                let message = if is_production() {
                    "Error del servidor".to_string()
                } else {
                    detail
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "error": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn is_production() -> bool {
    PRODUCTION_MODE.get().copied().unwrap_or(false)
}

/// Juntar los mensajes de cada violación de campo en un solo mensaje
fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            match &error.message {
                Some(msg) => messages.push(msg.to_string()),
                None => messages.push(format!("El campo '{}' es inválido", field)),
            }
        }
    }
    messages.sort();
    messages
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación con mensaje propio
pub fn validation_error(field: &'static str, message: &str) -> AppError {
    let mut error = ValidationError::new("custom");
    error.message = Some(message.to_string().into());

    let mut errors = ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = validation_error("alias", "El alias es requerido");
        match err {
            AppError::Validation(errors) => {
                let messages = collect_messages(&errors);
                assert_eq!(messages, vec!["El alias es requerido".to_string()]);
            }
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_duplicate_message_names_field() {
        let err = AppError::Duplicate("email".to_string());
        assert!(err.to_string().contains("email"));
    }

    #[tokio::test]
    async fn test_internal_detail_visible_outside_production() {
        // Sin modo fijado, el flag cae en desarrollo
        assert!(!is_production());

        let response = AppError::Internal("falla interna".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "falla interna");
    }
}

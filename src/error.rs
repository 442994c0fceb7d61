//! Error types for the catalog server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Reasons a login or a bearer token is rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Credenciales incorrectas")]
    InvalidCredentials,

    #[error("Token no existente")]
    MissingToken,

    #[error("Token no válido o caducado")]
    MalformedToken,

    #[error("Token no válido o caducado")]
    InvalidToken,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Método no permitido")]
    MethodNotAllowed,

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

/// Uniform response envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub response: T,
    pub message: String,
    pub status: &'static str,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(response: T, message: impl Into<String>) -> Self {
        Self {
            response,
            message: message.into(),
            status: "ok",
        }
    }
}

impl Envelope<Value> {
    pub fn error(response: Value, message: impl Into<String>) -> Self {
        Self {
            response,
            message: message.into(),
            status: "error",
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            // Validation failures share 404 with missing entities
            AppError::NotFound(_) | AppError::Validation(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BadRequest(_)
            | AppError::Database(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Serialization(e) => tracing::error!("Serialization error: {}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Unauthorized(reason) => tracing::debug!("Rejected request: {:?}", reason),
            _ => {}
        }

        let response = match &self {
            AppError::MethodNotAllowed => Value::Array(Vec::new()),
            _ => Value::Null,
        };

        (status, Json(Envelope::error(response, self.to_string()))).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

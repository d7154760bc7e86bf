use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use sealnote_types::api::ErrorBody;

/// Every way a request can fail. Each variant short-circuits the pipeline
/// at the stage that raised it and renders as a JSON `{"error": ...}` body,
/// which the envelope layer then seals like any other response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid encrypted data")]
    Decryption,

    #[error("No token provided")]
    MissingToken,

    /// Bad signature, malformed or expired token.
    #[error("Failed to authenticate token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Access denied")]
    Forbidden,

    #[error("Note not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("store failure: {0:#}")]
    Store(anyhow::Error),

    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Decryption | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingToken | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidToken | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::UsernameTaken => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Store(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Store(e) => {
                error!("Store failure: {:#}", e);
                "Internal server error".to_string()
            }
            ApiError::Internal => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (self.status(), Json(ErrorBody { error: message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

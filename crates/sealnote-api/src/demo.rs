//! Unauthenticated, unenveloped diagnostics.

use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use tracing::{info, warn};

use sealnote_types::api::{SealedBody, TestEncryptionResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// POST /api/test-encryption: opens a raw `{"data": ...}` body and echoes
/// the plaintext so a client can confirm it holds the right key.
pub async fn test_encryption(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<SealedBody>, ApiError>,
) -> Result<Json<TestEncryptionResponse>, ApiError> {
    let plaintext = sealnote_crypto::open_base64(&state.envelope_key, &body.data).map_err(|e| {
        warn!("Test decryption failed: {}", e);
        ApiError::Decryption
    })?;

    let decrypted = String::from_utf8(plaintext).map_err(|_| {
        warn!("Test decryption produced non-UTF-8 plaintext");
        ApiError::Decryption
    })?;

    info!("Test decryption succeeded ({} bytes)", decrypted.len());
    Ok(Json(TestEncryptionResponse {
        success: true,
        decrypted,
    }))
}

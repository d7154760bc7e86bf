use serde::{Deserialize, Serialize};

use crate::models::Note;

// -- Envelope --

/// The only body shape on the wire for enveloped routes.
/// `data` is base64 of `nonce || ciphertext || tag`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedBody {
    pub data: String,
}

/// Plaintext error body, sealed like any other response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// -- Session token claims --

/// `sub` carries the numeric user id as a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

// -- Notes --

/// Body of POST /notes and PUT /notes/{id}.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Returned by update and delete: the affected note plus a status line.
#[derive(Debug, Serialize, Deserialize)]
pub struct NoteMutationResponse {
    pub message: String,
    pub note: Note,
}

// -- Diagnostics --

#[derive(Debug, Serialize, Deserialize)]
pub struct TestEncryptionResponse {
    pub success: bool,
    pub decrypted: String,
}

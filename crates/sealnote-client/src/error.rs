use reqwest::StatusCode;
use thiserror::Error;

use sealnote_crypto::CodecError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status; `message` is the opened error body.
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("envelope error: {0}")]
    Envelope(#[from] CodecError),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not logged in")]
    NoToken,
}

pub type Result<T> = std::result::Result<T, ClientError>;

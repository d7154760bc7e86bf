use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Tag mismatch, wrong key, or an envelope too short to hold nonce and tag.
    #[error("envelope failed authentication")]
    AuthenticationFailure,

    #[error("envelope is not valid base64")]
    Encoding,

    #[error("encryption failed")]
    Encryption,

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, OsRng, rand_core::RngCore},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::CodecError;
use crate::keys::EnvelopeKey;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
/// Bytes added to every plaintext by `seal`.
pub const OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// Seal a plaintext with AES-256-GCM under a fresh random nonce.
/// Returns `nonce || ciphertext || tag`, exactly `plaintext.len() + OVERHEAD` bytes.
pub fn seal(key: &EnvelopeKey, plaintext: &[u8]) -> Result<Vec<u8>, CodecError> {
    let cipher = Aes256Gcm::new(key.as_gcm_key());

    // OsRng draws from the OS per call, so concurrent seals never share nonce state.
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm appends the 16-byte tag to the ciphertext.
    let sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CodecError::Encryption)?;

    let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Open an envelope produced by `seal`. All-or-nothing: any length or tag
/// problem yields `AuthenticationFailure` and no plaintext.
pub fn open(key: &EnvelopeKey, envelope: &[u8]) -> Result<Vec<u8>, CodecError> {
    if envelope.len() < OVERHEAD {
        return Err(CodecError::AuthenticationFailure);
    }

    let (nonce_bytes, ciphertext_and_tag) = envelope.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(key.as_gcm_key());

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext_and_tag)
        .map_err(|_| CodecError::AuthenticationFailure)
}

/// `seal`, then standard base64. This is the string carried in `{"data": ...}`.
pub fn seal_base64(key: &EnvelopeKey, plaintext: &[u8]) -> Result<String, CodecError> {
    Ok(BASE64.encode(seal(key, plaintext)?))
}

/// Standard base64 decode, then `open`.
pub fn open_base64(key: &EnvelopeKey, encoded: &str) -> Result<Vec<u8>, CodecError> {
    let envelope = BASE64.decode(encoded).map_err(|_| CodecError::Encoding)?;
    open(key, &envelope)
}

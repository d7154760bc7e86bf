use std::fmt;

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{Aes256Gcm, Key};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::CodecError;

pub const KEY_LEN: usize = 32;

/// The process-wide 256-bit envelope key. Shared by every client and the
/// server; there is no per-user or per-session key.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvelopeKey([u8; KEY_LEN]);

impl EnvelopeKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a configured key. Accepts either exactly 32 raw bytes of text
    /// (what the mobile client embeds) or base64 of 32 bytes.
    pub fn parse(configured: &str) -> Result<Self, CodecError> {
        if configured.len() == KEY_LEN {
            let mut key = [0u8; KEY_LEN];
            key.copy_from_slice(configured.as_bytes());
            return Ok(Self(key));
        }
        key_from_base64(configured)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub(crate) fn as_gcm_key(&self) -> &Key<Aes256Gcm> {
        Key::<Aes256Gcm>::from_slice(&self.0)
    }
}

impl fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnvelopeKey(..)")
    }
}

/// Generate a random 256-bit envelope key.
pub fn generate_key() -> EnvelopeKey {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    EnvelopeKey(key)
}

/// Encode a key to base64 for display/sharing.
pub fn key_to_base64(key: &EnvelopeKey) -> String {
    BASE64.encode(key.0)
}

/// Decode a base64 key.
pub fn key_from_base64(encoded: &str) -> Result<EnvelopeKey, CodecError> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|_| CodecError::InvalidKey("not base64".into()))?;
    let key: [u8; KEY_LEN] = bytes
        .try_into()
        .map_err(|_| CodecError::InvalidKey("key must be 32 bytes".into()))?;
    Ok(EnvelopeKey(key))
}

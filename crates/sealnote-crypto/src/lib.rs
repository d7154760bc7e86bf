/// Sealnote Crypto Library
///
/// Symmetric authenticated encryption for the request/response envelope.
/// Every body on the wire is `nonce(12) || ciphertext || tag(16)` under
/// AES-256-GCM with a single key shared between client and server out of band.

pub mod encrypt;
pub mod error;
pub mod keys;

#[cfg(test)]
mod proptests;

pub use encrypt::{NONCE_LEN, OVERHEAD, TAG_LEN, open, open_base64, seal, seal_base64};
pub use error::CodecError;
pub use keys::EnvelopeKey;

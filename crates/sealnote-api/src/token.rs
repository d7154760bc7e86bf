use std::time::Duration;

use anyhow::Context;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::warn;

use sealnote_types::api::Claims;

use crate::error::ApiError;

/// Identity of a verified caller, inserted into request extensions by
/// `require_auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
}

/// Sign a session token for `user_id` that expires `ttl` from now.
pub fn issue_token(secret: &str, user_id: i64, ttl: Duration) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let expires_at = now
        .checked_add_signed(chrono::Duration::from_std(ttl)?)
        .context("token expiry is out of range")?;
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Check signature and expiry. Stateless: there is no session table and
/// no revocation.
pub fn verify_token(secret: &str, token: &str) -> Result<Caller, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("Failed to authenticate token: {}", e);
        ApiError::InvalidToken
    })?;

    let user_id = token_data.claims.sub.parse::<i64>().map_err(|_| {
        warn!("Token subject is not a user id: {:?}", token_data.claims.sub);
        ApiError::InvalidToken
    })?;

    Ok(Caller { user_id })
}

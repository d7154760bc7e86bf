use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::token::verify_token;

/// Verify the session token from the Authorization header and expose the
/// caller as a `Caller` extension. The handler never runs on failure.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = match session_token(req.headers()) {
        Some(token) => verify_token(&state.jwt_secret, token)?,
        None => {
            warn!("No token provided for {} {}", req.method(), req.uri().path());
            return Err(ApiError::MissingToken);
        }
    };

    debug!("Token verified for user {}", caller.user_id);
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// The raw token; mobile clients send it bare, a `Bearer ` prefix is tolerated.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

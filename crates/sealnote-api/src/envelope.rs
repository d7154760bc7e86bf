//! Encrypted transport envelope.
//!
//! Inbound: a JSON body with a `data` field is base64-decoded and opened;
//! the recovered JSON replaces the body before any handler sees it. Bodies
//! without `data` pass through untouched. Outbound: every non-empty JSON
//! response, errors included, is sealed and replaced with `{"data": ...}`.

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::Value;
use tracing::{debug, error, warn};

use sealnote_crypto::EnvelopeKey;
use sealnote_types::api::SealedBody;

use crate::error::ApiError;
use crate::state::AppState;

/// Largest request body the envelope layer will buffer.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub async fn seal_envelope(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = &state.envelope_key;

    let response = match open_request(key, req).await {
        Ok(req) => next.run(req).await,
        Err(e) => e.into_response(),
    };

    seal_response(key, response).await
}

async fn open_request(key: &EnvelopeKey, req: Request) -> Result<Request, ApiError> {
    let (mut parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        let inner = e.into_inner();
        if inner.downcast_ref::<LengthLimitError>().is_some() {
            warn!("Rejecting request body over {} bytes", MAX_BODY_BYTES);
            ApiError::PayloadTooLarge
        } else {
            warn!("Failed to read request body: {}", inner);
            ApiError::Validation("Failed to read request body".into())
        }
    })?;

    if bytes.is_empty() {
        return Ok(Request::from_parts(parts, Body::empty()));
    }

    // Anything that is not a JSON object carrying `data` is left for the
    // handler's own extractor to accept or reject.
    let sealed = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut map)) => match map.remove("data") {
            Some(data) => data,
            None => return Ok(Request::from_parts(parts, Body::from(bytes))),
        },
        _ => return Ok(Request::from_parts(parts, Body::from(bytes))),
    };

    let Value::String(sealed) = sealed else {
        warn!("Rejecting envelope: data field is not a string");
        return Err(ApiError::Decryption);
    };

    let plaintext = sealnote_crypto::open_base64(key, &sealed).map_err(|e| {
        warn!("Error decrypting request body: {}", e);
        ApiError::Decryption
    })?;

    if serde_json::from_slice::<Value>(&plaintext).is_err() {
        warn!("Error decrypting request body: plaintext is not JSON");
        return Err(ApiError::Decryption);
    }

    debug!(
        "Opened request envelope: {} sealed bytes -> {} plaintext bytes",
        sealed.len(),
        plaintext.len()
    );

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(Request::from_parts(parts, Body::from(plaintext)))
}

async fn seal_response(key: &EnvelopeKey, response: Response) -> Response {
    if !is_json(response.headers()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let plaintext = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to buffer response body for sealing: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // No body, nothing to seal.
    if plaintext.is_empty() {
        return Response::from_parts(parts, Body::empty());
    }

    let sealed = sealnote_crypto::seal_base64(key, &plaintext)
        .map_err(anyhow::Error::from)
        .and_then(|data| Ok(serde_json::to_vec(&SealedBody { data })?));

    match sealed {
        Ok(body) => {
            debug!(
                "Sealed {} response: {} plaintext bytes -> {} bytes",
                parts.status,
                plaintext.len(),
                body.len()
            );
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        Err(e) => {
            // Never fall back to sending the plaintext.
            error!("Failed to seal response body: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

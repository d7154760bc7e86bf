use std::sync::Arc;
use std::time::Duration;

use sealnote_crypto::EnvelopeKey;
use sealnote_db::Store;
use tracing::{error, warn};

use crate::config::Settings;
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Box<dyn Store>,
    pub envelope_key: EnvelopeKey,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub allow_idor: bool,
}

impl AppStateInner {
    pub fn new(settings: &Settings, store: Box<dyn Store>) -> AppState {
        if settings.allow_idor {
            warn!("Ownership checks are DISABLED (SEALNOTE_ALLOW_IDOR=true); any user can read, edit or delete any note");
        }

        Arc::new(Self {
            store,
            envelope_key: settings.envelope_key.clone(),
            jwt_secret: settings.jwt_secret.clone(),
            token_ttl: settings.token_ttl,
            allow_idor: settings.allow_idor,
        })
    }
}

/// Run a blocking store call off the async runtime.
pub async fn with_store<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn Store) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(state.store.as_ref()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::Store)
}

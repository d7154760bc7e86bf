use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::envelope::seal_envelope;
use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, demo, notes};

/// Build the full application router.
///
/// `/health` and `/api/test-encryption` sit outside the envelope. Everything
/// else under `/api` is opened on the way in and sealed on the way out; the
/// note routes additionally require a session token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/notes", post(notes::create_note).get(notes::list_notes))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Envelope is the outermost layer so auth failures are sealed too.
    let enveloped = public_routes
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), seal_envelope));

    let api = Router::new()
        .route("/test-encryption", post(demo::test_encryption))
        .merge(enveloped);

    Router::new()
        .route("/health", get(demo::health))
        .nest("/api", api)
        .with_state(state)
}

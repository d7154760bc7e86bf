//! HTTP surface of the sealed-notes server.
//!
//! Request pipeline: envelope open -> bearer token check -> handler
//! (ownership guard on by-id routes) -> envelope seal.

pub mod auth;
pub mod config;
pub mod demo;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod notes;
pub mod routes;
pub mod state;
pub mod token;

pub use config::Settings;
pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};

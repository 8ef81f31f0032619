//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Build authentication router
/// - /api/login, /api/register: public (skipped by `require_auth`)
/// - /api/me: protected by the global `require_auth` middleware
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/login", post(handler::login))
        .route("/api/register", post(handler::register))
        .route("/api/me", get(handler::me))
}

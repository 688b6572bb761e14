//! Authentication API Module

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Auth router. Login and register are public; `me` requires a token.
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/me", get(handler::me))
}

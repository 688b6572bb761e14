//! User API Module

mod handler;

use axum::{Router, middleware, routing::delete, routing::get, routing::put};

use crate::auth::require_access;
use crate::core::ServerState;
use shared::policy::{Action, Resource};

/// User router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    // Self-service: any authenticated user edits their own profile
    let profile = Router::new().route("/profile", put(handler::update_profile));

    // Directory management is admin-only per the access matrix
    let list = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_access(
            Resource::Users,
            Action::View,
        )));
    let update = Router::new()
        .route("/{id}", put(handler::update))
        .layer(middleware::from_fn(require_access(
            Resource::Users,
            Action::Update,
        )));
    let remove = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_access(
            Resource::Users,
            Action::Delete,
        )));

    profile.merge(list).merge(update).merge(remove)
}

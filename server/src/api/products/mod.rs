//! Product API Module

mod handler;

use axum::{Router, middleware, routing::delete, routing::get, routing::post, routing::put};

use crate::auth::require_access;
use crate::core::ServerState;
use shared::policy::{Action, Resource};

/// Product router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    // Catalog reads are public; the storefront renders before sign-in
    let read = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // Writes follow the access matrix (admin, manager, cashier)
    let create = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_access(
            Resource::Products,
            Action::Create,
        )));
    let update = Router::new()
        .route("/{id}", put(handler::update))
        .layer(middleware::from_fn(require_access(
            Resource::Products,
            Action::Update,
        )));
    let remove = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_access(
            Resource::Products,
            Action::Delete,
        )));

    read.merge(create).merge(update).merge(remove)
}

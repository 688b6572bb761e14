//! Order API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post, routing::put};

use crate::auth::require_access;
use crate::core::ServerState;
use shared::policy::{Action, Resource};

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // Any authenticated caller: customers order for themselves, staff enter
    // walk-ins; /my-orders is always scoped to the caller's own id
    let base = Router::new()
        .route("/", post(handler::create))
        .route("/my-orders", get(handler::my_orders));

    // Staff queue views and status changes per the access matrix
    let staff_list = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_access(
            Resource::Orders,
            Action::View,
        )));
    let staff_update = Router::new()
        .route("/{id}/status", put(handler::update_status))
        .layer(middleware::from_fn(require_access(
            Resource::Orders,
            Action::Update,
        )));

    base.merge(staff_list).merge(staff_update)
}

//! Order API Handlers
//!
//! Thin HTTP adapters over [`OrderService`]; authorization, validation, and
//! atomicity all live behind the service boundary.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{Order, OrderCreate, OrderStatusUpdate};

/// Place an order (201 on success)
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.orders().place_order(&current, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List all orders, newest first (staff)
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders().list_orders(&current).await?;
    Ok(Json(orders))
}

/// The caller's own orders, newest first
pub async fn my_orders(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders().list_own_orders(&current).await?;
    Ok(Json(orders))
}

/// Transition an order's status (staff)
pub async fn update_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders()
        .change_status(&current, id, payload.status)
        .await?;
    Ok(Json(order))
}

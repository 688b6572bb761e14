//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::product;
use crate::utils::{AppError, AppResult};
use shared::models::{Product, ProductCreate, ProductUpdate};

/// List the catalog
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = product::find_all(state.pool()).await?;
    Ok(Json(products))
}

/// Get product by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let found = product::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;
    Ok(Json(found))
}

/// Create a new product
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    payload.validate()?;
    let created = product::create(state.pool(), payload).await?;
    audit_log!("product_created", actor_id = current.id, product_id = created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a product
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    payload.validate()?;
    let updated = product::update(state.pool(), id, payload).await?;
    audit_log!("product_updated", actor_id = current.id, product_id = id);
    Ok(Json(updated))
}

/// Delete a product. Existing order lines keep their snapshot of it.
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = product::delete(state.pool(), id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Product {id} not found")));
    }
    audit_log!("product_deleted", actor_id = current.id, product_id = id);
    Ok(Json(true))
}

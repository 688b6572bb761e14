//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::{AppError, AppResult};
use shared::models::{ProfileUpdate, UserUpdate, UserView};

/// List all users (admin)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserView>>> {
    let users = user::find_all(state.pool()).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// Self-service profile update for the authenticated user
pub async fn update_profile(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ProfileUpdate>,
) -> AppResult<Json<UserView>> {
    payload.validate()?;
    let updated = user::update_profile(state.pool(), current.id, payload).await?;
    audit_log!("profile_updated", user_id = current.id);
    Ok(Json(updated.into()))
}

/// Admin update of any user, including role and status
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserView>> {
    payload.validate()?;
    let updated = user::update(state.pool(), id, payload).await?;
    audit_log!(
        "user_updated",
        actor_id = current.id,
        user_id = id,
        role = %updated.role,
        status = %updated.status
    );
    Ok(Json(updated.into()))
}

/// Admin delete. Past orders keep their customer snapshot.
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if current.id == id {
        return Err(AppError::Invalid("Cannot delete own account".to_string()));
    }
    let deleted = user::delete(state.pool(), id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }
    audit_log!("user_deleted", actor_id = current.id, user_id = id);
    Ok(Json(true))
}

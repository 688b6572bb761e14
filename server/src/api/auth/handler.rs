//! Authentication Handlers
//!
//! Registration, login, and current-user lookup. Login uses a fixed delay
//! and a uniform failure message so timing and wording leak nothing about
//! which emails exist.

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::audit_log;
use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::user::{self, NewUser};
use crate::utils::{AppError, AppResult};
use shared::models::{LoginRequest, LoginResponse, RegisterRequest, Role, UserStatus, UserView};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Treat empty strings as absent for optional profile fields
fn normalize(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

/// Register a new user account
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    payload.validate()?;

    let role = payload.role.unwrap_or(Role::Customer);
    let password_hash = password::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;

    let created = user::create(
        state.pool(),
        NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            role,
            phone: normalize(payload.phone),
            address: normalize(payload.address),
        },
    )
    .await?;

    audit_log!(
        "user_registered",
        user_id = created.id,
        role = %created.role
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Login handler: verifies credentials and returns a JWT
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let account = user::find_by_email(state.pool(), &req.email).await?;

    // Fixed delay before checking the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let account = match account {
        Some(u) => {
            let password_valid = password::verify_password(&req.password, &u.password_hash)
                .map_err(|e| AppError::Internal(format!("Password verification failed: {e}")))?;

            if !password_valid {
                audit_log!("login_failed", email = %req.email, reason = "invalid_credentials");
                return Err(AppError::invalid_credentials());
            }
            u
        }
        None => {
            audit_log!("login_failed", email = %req.email, reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    // Inactive accounts cannot authenticate, so they never reach the core
    if account.status == UserStatus::Inactive {
        audit_log!("login_failed", user_id = account.id, reason = "inactive");
        return Err(AppError::Forbidden(
            "Your account is inactive. Please contact the administrator.".to_string(),
        ));
    }

    let token = state
        .jwt_service()
        .generate_token(&account)
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {e}")))?;

    audit_log!("login_success", user_id = account.id, role = %account.role);
    tracing::info!(user_id = account.id, email = %account.email, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: account.into(),
    }))
}

/// Current user info, fresh from the database
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<UserView>> {
    let account = user::find_by_id(state.pool(), current.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", current.id)))?;
    Ok(Json(account.into()))
}

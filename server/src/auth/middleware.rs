//! Authentication and Authorization Middleware
//!
//! [`require_auth`] validates the bearer token and injects [`CurrentUser`]
//! into request extensions. [`require_access`] gates a route group on the
//! role policy matrix.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::policy::{Action, Resource, can_access};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Routes reachable without a token: login, registration, health, and
/// catalog browsing (the storefront renders these before sign-in).
fn is_public_route(method: &http::Method, path: &str) -> bool {
    if path == "/api/auth/login" || path == "/api/auth/register" || path == "/api/health" {
        return true;
    }
    *method == http::Method::GET && path.starts_with("/api/products")
}

/// Authentication middleware: requires a valid bearer token.
///
/// Skips OPTIONS (CORS preflight), non-API paths, and the public routes
/// above. On success, [`CurrentUser`] is stored in the request extensions.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // Allow CORS preflight through
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes fall through (they 404 on their own)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => {
            JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?
        }
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::Unauthorized);
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims).map_err(|e| {
                security_log!("WARN", "auth_malformed_claims", error = e);
                AppError::InvalidToken
            })?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

/// Authorization middleware: requires the caller's role to pass the policy
/// matrix for (resource, action).
///
/// ```ignore
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_access(Resource::Products, Action::Create)))
/// ```
///
/// Denials return 403 and are logged; they are never silently dropped.
pub fn require_access(
    resource: Resource,
    action: Action,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::Unauthorized)?;

            if !can_access(user.role, resource, action) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    role = user.role.as_str(),
                    resource = format!("{:?}", resource),
                    action = format!("{:?}", action)
                );
                return Err(AppError::Forbidden(format!(
                    "Role '{}' may not {:?} {:?}",
                    user.role, action, resource
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

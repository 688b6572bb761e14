//! Server Implementation
//!
//! Router assembly, middleware layering, and the HTTP serve loop.

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::require_auth;
use crate::core::{Config, ServerState};

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Auth API - login/register public, the rest authenticated
        .merge(api::auth::router())
        // User directory - admin management + self-service profile
        .merge(api::users::router())
        // Product catalog - reads public, writes staff-gated
        .merge(api::products::router())
        // Orders - the core lifecycle API
        .merge(api::orders::router())
        // Health - public probe
        .merge(api::health::router())
}

/// Build the fully configured application with middleware and state
pub fn build_app(state: &ServerState) -> Router {
    build_router()
        // CORS - the storefront is served from a different origin
        .layer(CorsLayer::permissive())
        // Request tracing (INFO level)
        .layer(TraceLayer::new_for_http())
        // JWT authentication - injects CurrentUser before routes run
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state.clone())
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (tests share it with direct calls)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await,
        };

        let app = build_app(&state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Bakery server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        Ok(())
    }
}

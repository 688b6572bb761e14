//! Bakery Server - storefront and back-office backend
//!
//! # Architecture
//!
//! - **Core** (`core`): configuration, shared state, HTTP server
//! - **Auth** (`auth`): JWT + argon2 authentication, policy middleware
//! - **Database** (`db`): embedded SQLite storage via sqlx
//! - **Orders** (`orders`): the order lifecycle domain service
//! - **API** (`api`): RESTful routes and handlers
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT auth, policy middleware
//! ├── db/            # pool, migrations, repositories
//! ├── orders/        # draft validation, money, store, service
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

// Re-export the common types
pub use crate::auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use crate::orders::OrderService;
pub use crate::utils::{AppError, AppResult};

// Audit logging macro: structured events for every attributable mutation.
// Fields pass straight through to tracing, so `%`/`?` sigils work.
#[macro_export]
macro_rules! audit_log {
    ($action:expr, $($fields:tt)*) => {
        tracing::info!(
            target: "audit",
            action = $action,
            $($fields)*
        );
    };
    ($action:expr) => {
        tracing::info!(target: "audit", action = $action);
    };
}

// Security logging macro: auth failures and permission denials
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($fields:tt)*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($fields)*
        );
    };
}

/// Load .env and initialize logging; call once at startup
pub fn setup_environment() {
    dotenv::dotenv().ok();
    utils::logger::init_logger();
}

//! Server State
//!
//! [`ServerState`] holds the shared service handles every request sees:
//! configuration, the database pool, the JWT service, and the order service.
//! It is cheap to clone (Arc-backed) and injected via axum state; there are
//! no ambient singletons.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::{OrderService, SqliteCatalog, SqliteOrderStore};

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// JWT authentication service
    pub jwt_service: Arc<JwtService>,
    /// Order orchestration service
    pub orders: Arc<OrderService>,
}

impl ServerState {
    pub fn new(
        config: Config,
        pool: SqlitePool,
        jwt_service: Arc<JwtService>,
        orders: Arc<OrderService>,
    ) -> Self {
        Self {
            config,
            pool,
            jwt_service,
            orders,
        }
    }

    /// Initialize the full state: work dir, database (with migrations), and
    /// services wired together.
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be initialized; the server cannot
    /// run without it.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_path();
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let pool = db_service.pool;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let orders = Arc::new(OrderService::new(
            Arc::new(SqliteOrderStore::new(pool.clone())),
            Arc::new(SqliteCatalog::new(pool.clone())),
            config.request_timeout(),
        ));

        Self::new(config.clone(), pool, jwt_service, orders)
    }

    /// Build a state over an existing pool (used by tests)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let orders = Arc::new(OrderService::new(
            Arc::new(SqliteOrderStore::new(pool.clone())),
            Arc::new(SqliteCatalog::new(pool.clone())),
            config.request_timeout(),
        ));
        Self::new(config, pool, jwt_service, orders)
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }
}

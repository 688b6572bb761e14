//! Store and catalog seams
//!
//! The order service depends on these traits rather than on SQLite directly,
//! so tests can substitute in-memory doubles. There is exactly one order
//! store implementation per deployment; the old habit of keeping a mock
//! order list next to the real one lives on only as a test double.

use async_trait::async_trait;
use shared::models::{Order, OrderStatus, Product};
use sqlx::SqlitePool;

use super::draft::OrderDraft;
use crate::db::repository::{self, RepoResult};

/// Durable order persistence. Implementations must make `create` atomic
/// (order row + line rows + stock reservation all-or-nothing) and
/// `update_status` an atomic read-modify-write.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, draft: OrderDraft) -> RepoResult<Order>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>>;
    async fn find_all(&self) -> RepoResult<Vec<Order>>;
    async fn find_for_customer(&self, customer_id: i64) -> RepoResult<Vec<Order>>;
    async fn update_status(&self, id: i64, new_status: OrderStatus) -> RepoResult<Order>;
}

/// Read-only product lookups the validator consumes
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get_product(&self, id: i64) -> RepoResult<Option<Product>>;
}

/// SQLite-backed store, delegating to the order repository
#[derive(Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn create(&self, draft: OrderDraft) -> RepoResult<Order> {
        repository::order::create(&self.pool, draft).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        repository::order::find_by_id(&self.pool, id).await
    }

    async fn find_all(&self) -> RepoResult<Vec<Order>> {
        repository::order::find_all(&self.pool).await
    }

    async fn find_for_customer(&self, customer_id: i64) -> RepoResult<Vec<Order>> {
        repository::order::find_for_customer(&self.pool, customer_id).await
    }

    async fn update_status(&self, id: i64, new_status: OrderStatus) -> RepoResult<Order> {
        repository::order::update_status(&self.pool, id, new_status).await
    }
}

/// SQLite-backed catalog, delegating to the product repository
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductCatalog for SqliteCatalog {
    async fn get_product(&self, id: i64) -> RepoResult<Option<Product>> {
        repository::product::find_by_id(&self.pool, id).await
    }
}

//! Repository Module
//!
//! CRUD operations over the SQLite tables. Repositories are plain modules of
//! `pub async fn`s taking a `&SqlitePool`; everything that must be atomic
//! runs inside an explicit transaction.

pub mod order;
pub mod product;
pub mod user;

use shared::models::OrderStatus;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(i64),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// True when the error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

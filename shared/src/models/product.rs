//! Product Model
//!
//! Catalog entries. The order subsystem only ever reads these (name, price,
//! stock); mutation belongs to the back office.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product entity (catalog entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Price in currency unit
    pub price: f64,
    /// Units currently available for sale
    pub stock: i64,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub stock: i64,
    pub image_url: Option<String>,
}

/// Update product payload (unset fields keep their value)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub image_url: Option<String>,
}

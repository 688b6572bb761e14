//! Shared domain types for the bakery storefront and back office.
//!
//! This crate holds everything both the server and future clients need to
//! agree on:
//!
//! - **Models** (`models`): users, products, orders and their payloads
//! - **Policy** (`policy`): the role/resource/action access matrix
//! - **Utilities** (`util`): timestamps and resource ID generation
//!
//! The `db` feature gates the `sqlx` derives so consumers that never touch
//! the database stay free of it.

pub mod models;
pub mod policy;
pub mod util;

// Re-export the common types
pub use models::{
    Order, OrderLine, OrderStatus, Product, Role, User, UserStatus,
};
pub use policy::{Action, Resource, can_access};

//! API Routes
//!
//! # Structure
//!
//! - [`health`] - health probe
//! - [`auth`] - registration, login, current user
//! - [`users`] - user directory (admin) and self-service profile
//! - [`products`] - product catalog
//! - [`orders`] - order lifecycle

pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

//! Order Domain
//!
//! - [`draft`] - pure validation and construction of order drafts
//! - [`money`] - decimal-precise monetary arithmetic
//! - [`store`] - the store/catalog seams and their SQLite implementations
//! - [`service`] - the orchestrating service every caller goes through

pub mod draft;
pub mod money;
pub mod service;
pub mod store;

pub use draft::{CustomerInfo, DraftError, OrderDraft};
pub use service::OrderService;
pub use store::{OrderStore, ProductCatalog, SqliteCatalog, SqliteOrderStore};

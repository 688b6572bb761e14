//! Domain Models
//!
//! Entities and request/response payloads shared between the server and its
//! clients. Each model file carries the entity plus its Create/Update
//! payloads.

pub mod order;
pub mod product;
pub mod user;

pub use order::{
    Order, OrderCreate, OrderLine, OrderLineRequest, OrderStatus, OrderStatusUpdate,
    ParseOrderStatusError,
};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use user::{
    LoginRequest, LoginResponse, ParseRoleError, ProfileUpdate, RegisterRequest, Role, User,
    UserStatus, UserUpdate, UserView,
};

//! Order Model
//!
//! The order aggregate: a customer snapshot, an immutable line list, a total
//! computed once at creation, and a status driven by a small state machine.
//!
//! Status lifecycle:
//!
//! ```text
//! pending ──→ processing ──→ completed
//!    │             │
//!    │             └────────→ cancelled
//!    ├──────────────────────→ completed
//!    └──────────────────────→ cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Orders are never deleted;
//! cancellation is a status, not a removal.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states admit no further transitions
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// The full transition table. Self-transitions and anything out of a
    /// terminal state are rejected; nothing ever moves back to `pending`.
    pub const fn can_transition(self, to: OrderStatus) -> bool {
        matches!(
            (self, to),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Pending, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Completed)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
        )
    }

    /// States a transition into `to` may legally start from. Used by the
    /// store to build the guarded UPDATE that makes transitions atomic.
    pub const fn allowed_sources(to: OrderStatus) -> &'static [OrderStatus] {
        match to {
            OrderStatus::Pending => &[],
            OrderStatus::Processing => &[OrderStatus::Pending],
            OrderStatus::Completed | OrderStatus::Cancelled => {
                &[OrderStatus::Pending, OrderStatus::Processing]
            }
        }
    }
}

/// Error when parsing an unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Case-insensitive: the legacy database stored "Pending" capitalized
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(ParseOrderStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Order line (owned exclusively by its parent order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub product_id: i64,
    /// Product name snapshot at order time
    pub product_name: String,
    pub quantity: i64,
    /// Catalog price at order time; later price changes never touch this
    pub unit_price: f64,
    /// quantity * unit_price, fixed at creation
    pub subtotal: f64,
}

/// Order entity (root aggregate)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Null for guest/walk-in orders, and allowed to dangle if the
    /// user is later deleted; the snapshot fields below stay authoritative
    pub customer_id: Option<i64>,
    /// Customer name captured at creation time
    pub customer_name: String,
    /// Customer email captured at creation time (guests may have none)
    pub customer_email: Option<String>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    pub lines: Vec<OrderLine>,
    /// Sum of line subtotals, computed and stored at creation
    pub total: f64,
    pub status: OrderStatus,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: i64,
    /// Stamped the first time the order enters `processing`
    pub start_time: Option<i64>,
    /// Stamped when the order enters `completed`
    pub completed_time: Option<i64>,
}

/// One requested line in a create-order call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub items: Vec<OrderLineRequest>,
    /// Walk-in customer name, used when a staff member places the order
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Idempotency token: a retried create with the same token returns the
    /// already-persisted order instead of inserting a duplicate
    pub client_token: Option<String>,
}

/// Update status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

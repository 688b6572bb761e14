//! Order Draft Builder
//!
//! Pure construction and validation of an order draft from a customer
//! identity, the requested lines, and a catalog lookup. No I/O: the caller
//! resolves catalog entries first and passes a lookup over them. Unit prices
//! are pinned to the catalog price observed here; later price changes never
//! alter the order.
//!
//! The stock check here is advisory (it catches obviously stale carts with a
//! friendly error); the authoritative re-check happens inside the store's
//! create transaction.

use shared::models::{OrderCreate, OrderLine, Product};

use super::money;

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 9999;

/// Rejection reasons for an order draft
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("order must contain at least one item")]
    EmptyOrder,

    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: i64, quantity: i64 },

    #[error("unknown product {product_id}")]
    UnknownProduct { product_id: i64 },

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },
}

/// The identity an order is placed for. For customers this comes from the
/// authenticated caller; for staff walk-in orders, from the request body.
#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
}

/// A fully validated, unsaved order. The store assigns the persistent id.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub client_token: Option<String>,
    pub lines: Vec<OrderLine>,
    pub total: f64,
}

/// Validate the requested lines against the catalog and build the draft.
pub fn build_draft(
    customer: CustomerInfo,
    request: &OrderCreate,
    lookup: impl Fn(i64) -> Option<Product>,
) -> Result<OrderDraft, DraftError> {
    if request.items.is_empty() {
        return Err(DraftError::EmptyOrder);
    }

    let mut lines = Vec::with_capacity(request.items.len());
    for item in &request.items {
        if item.quantity < 1 || item.quantity > MAX_QUANTITY {
            return Err(DraftError::InvalidQuantity {
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }

        let product = lookup(item.product_id).ok_or(DraftError::UnknownProduct {
            product_id: item.product_id,
        })?;

        if item.quantity > product.stock {
            return Err(DraftError::InsufficientStock {
                product_id: item.product_id,
                requested: item.quantity,
                available: product.stock,
            });
        }

        lines.push(OrderLine {
            product_id: product.id,
            product_name: product.name,
            quantity: item.quantity,
            unit_price: product.price,
            subtotal: money::line_subtotal(product.price, item.quantity),
        });
    }

    let total = money::order_total(lines.iter().map(|l| l.subtotal));

    Ok(OrderDraft {
        customer_id: customer.id,
        customer_name: customer.name,
        customer_email: customer.email,
        phone: request.phone.clone(),
        address: request.address.clone(),
        client_token: request.client_token.clone(),
        lines,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderLineRequest;
    use std::collections::HashMap;

    fn catalog() -> HashMap<i64, Product> {
        let mut map = HashMap::new();
        for (id, name, price, stock) in [
            (7, "Croissant", 22.00, 10),
            (8, "Sourdough Loaf", 8.50, 3),
            (9, "Matcha Latte", 5.50, 0),
        ] {
            map.insert(
                id,
                Product {
                    id,
                    name: name.to_string(),
                    description: None,
                    price,
                    stock,
                    image_url: None,
                    created_at: 0,
                    updated_at: 0,
                },
            );
        }
        map
    }

    fn request(items: Vec<OrderLineRequest>) -> OrderCreate {
        OrderCreate {
            items,
            customer_name: None,
            customer_email: None,
            phone: None,
            address: None,
            client_token: None,
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            id: Some(1),
            name: "Jane Doe".into(),
            email: Some("jane@example.com".into()),
        }
    }

    #[test]
    fn builds_draft_with_pinned_prices_and_exact_total() {
        let cat = catalog();
        let req = request(vec![OrderLineRequest { product_id: 7, quantity: 2 }]);
        let draft = build_draft(customer(), &req, |id| cat.get(&id).cloned()).unwrap();
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].unit_price, 22.00);
        assert_eq!(draft.lines[0].subtotal, 44.00);
        assert_eq!(draft.total, 44.00);
        assert_eq!(draft.customer_id, Some(1));
    }

    #[test]
    fn total_spans_multiple_lines() {
        let cat = catalog();
        let req = request(vec![
            OrderLineRequest { product_id: 7, quantity: 1 },
            OrderLineRequest { product_id: 8, quantity: 2 },
        ]);
        let draft = build_draft(customer(), &req, |id| cat.get(&id).cloned()).unwrap();
        assert_eq!(draft.total, 39.00);
    }

    #[test]
    fn rejects_empty_order() {
        let cat = catalog();
        let req = request(vec![]);
        let err = build_draft(customer(), &req, |id| cat.get(&id).cloned()).unwrap_err();
        assert_eq!(err, DraftError::EmptyOrder);
    }

    #[test]
    fn rejects_zero_and_negative_quantities() {
        let cat = catalog();
        for quantity in [0, -1, -42] {
            let req = request(vec![OrderLineRequest { product_id: 7, quantity }]);
            let err = build_draft(customer(), &req, |id| cat.get(&id).cloned()).unwrap_err();
            assert_eq!(
                err,
                DraftError::InvalidQuantity { product_id: 7, quantity }
            );
        }
    }

    #[test]
    fn rejects_unknown_product() {
        let cat = catalog();
        let req = request(vec![OrderLineRequest { product_id: 999, quantity: 1 }]);
        let err = build_draft(customer(), &req, |id| cat.get(&id).cloned()).unwrap_err();
        assert_eq!(err, DraftError::UnknownProduct { product_id: 999 });
    }

    #[test]
    fn rejects_quantity_beyond_stock() {
        let cat = catalog();
        let req = request(vec![OrderLineRequest { product_id: 8, quantity: 4 }]);
        let err = build_draft(customer(), &req, |id| cat.get(&id).cloned()).unwrap_err();
        assert_eq!(
            err,
            DraftError::InsufficientStock { product_id: 8, requested: 4, available: 3 }
        );
    }

    #[test]
    fn sold_out_product_rejects_any_quantity() {
        let cat = catalog();
        let req = request(vec![OrderLineRequest { product_id: 9, quantity: 1 }]);
        let err = build_draft(customer(), &req, |id| cat.get(&id).cloned()).unwrap_err();
        assert_eq!(
            err,
            DraftError::InsufficientStock { product_id: 9, requested: 1, available: 0 }
        );
    }
}

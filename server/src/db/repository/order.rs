//! Order Repository
//!
//! The only code that touches the `orders` and `order_lines` tables. Creation
//! writes the order, its lines, and the stock decrement as one transaction;
//! status changes are a single guarded UPDATE so concurrent writers resolve
//! deterministically (the loser's source-state guard no longer matches).

use super::{RepoError, RepoResult, is_unique_violation};
use crate::orders::draft::OrderDraft;
use shared::models::{Order, OrderLine, OrderStatus};
use sqlx::{SqliteConnection, SqlitePool};

const ORDER_SELECT: &str = "SELECT id, customer_id, customer_name, customer_email, total, status, phone, address, created_at, start_time, completed_time FROM orders";

const LINE_SELECT: &str = "SELECT product_id, product_name, quantity, unit_price, subtotal FROM order_lines";

async fn load_lines(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderLine>> {
    let sql = format!("{LINE_SELECT} WHERE order_id = ? ORDER BY line_index");
    let lines = sqlx::query_as::<_, OrderLine>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(lines)
}

async fn attach_lines(pool: &SqlitePool, mut orders: Vec<Order>) -> RepoResult<Vec<Order>> {
    for order in &mut orders {
        order.lines = load_lines(pool, order.id).await?;
    }
    Ok(orders)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(mut order) => {
            order.lines = load_lines(pool, order.id).await?;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}

async fn find_by_client_token(pool: &SqlitePool, token: &str) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE client_token = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(token)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(mut order) => {
            order.lines = load_lines(pool, order.id).await?;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}

/// All orders, newest first (creation time, then id, both descending)
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} ORDER BY created_at DESC, id DESC");
    let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?;
    attach_lines(pool, orders).await
}

/// A single customer's orders, same ordering as `find_all`
pub async fn find_for_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE customer_id = ? ORDER BY created_at DESC, id DESC");
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
    attach_lines(pool, orders).await
}

/// Decrement stock for every line, failing the transaction if any product
/// no longer covers the requested quantity.
async fn reserve_stock(
    conn: &mut SqliteConnection,
    draft: &OrderDraft,
    now: i64,
) -> RepoResult<()> {
    for line in &draft.lines {
        let res = sqlx::query(
            "UPDATE products SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1",
        )
        .bind(line.quantity)
        .bind(now)
        .bind(line.product_id)
        .execute(&mut *conn)
        .await?;

        if res.rows_affected() == 0 {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
                    .bind(line.product_id)
                    .fetch_optional(&mut *conn)
                    .await?;
            return Err(match available {
                None => RepoError::UnknownProduct(line.product_id),
                Some(stock) => RepoError::OutOfStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: stock,
                },
            });
        }
    }
    Ok(())
}

/// Persist a validated draft: stock re-check, order row, and all line rows in
/// one transaction. Either every row becomes visible or none do.
pub async fn create(pool: &SqlitePool, draft: OrderDraft) -> RepoResult<Order> {
    // Idempotent replay: a token we have already seen returns the stored order
    if let Some(token) = &draft.client_token {
        if let Some(existing) = find_by_client_token(pool, token).await? {
            return Ok(existing);
        }
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    reserve_stock(&mut tx, &draft, now).await?;

    let insert = sqlx::query(
        "INSERT INTO orders (id, customer_id, customer_name, customer_email, total, status, phone, address, client_token, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?7, ?8, ?9)",
    )
    .bind(id)
    .bind(draft.customer_id)
    .bind(&draft.customer_name)
    .bind(&draft.customer_email)
    .bind(draft.total)
    .bind(&draft.phone)
    .bind(&draft.address)
    .bind(&draft.client_token)
    .bind(now)
    .execute(&mut *tx)
    .await;

    if let Err(e) = insert {
        // A concurrent retry with the same token won the race; hand back its order
        if is_unique_violation(&e) {
            if let Some(token) = &draft.client_token {
                drop(tx);
                if let Some(existing) = find_by_client_token(pool, token).await? {
                    return Ok(existing);
                }
            }
        }
        return Err(e.into());
    }

    for (idx, line) in draft.lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_lines (order_id, line_index, product_id, product_name, quantity, unit_price, subtotal) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(id)
        .bind(idx as i64)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.subtotal)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Order missing after commit".into()))
}

/// Atomic read-modify-write status transition.
///
/// The UPDATE only matches when the current status is a legal source for the
/// target, so two concurrent callers racing on the same order resolve
/// deterministically: the first commit wins, the second affects zero rows and
/// is rejected below. Entering `processing` stamps `start_time` once;
/// entering `completed` stamps `completed_time`; cancelling restores the
/// reserved stock within the same transaction.
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    new_status: OrderStatus,
) -> RepoResult<Order> {
    let sources = OrderStatus::allowed_sources(new_status);
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let affected = if sources.is_empty() {
        0
    } else {
        let placeholders = vec!["?"; sources.len()].join(", ");
        let sql = format!(
            "UPDATE orders SET status = ?1, \
             start_time = CASE WHEN ?1 = 'processing' THEN COALESCE(start_time, ?2) ELSE start_time END, \
             completed_time = CASE WHEN ?1 = 'completed' THEN ?2 ELSE completed_time END \
             WHERE id = ?3 AND status IN ({placeholders})"
        );
        let mut query = sqlx::query(&sql).bind(new_status.as_str()).bind(now).bind(id);
        for source in sources {
            query = query.bind(source.as_str());
        }
        query.execute(&mut *tx).await?.rows_affected()
    };

    if affected == 0 {
        // Disambiguate: missing order vs. rejected transition
        let current: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            return Err(RepoError::NotFound(format!("Order {id} not found")));
        };
        let from: OrderStatus = current
            .parse()
            .map_err(|_| RepoError::Database(format!("Corrupt order status: {current}")))?;
        return Err(RepoError::InvalidTransition {
            from,
            to: new_status,
        });
    }

    if new_status == OrderStatus::Cancelled {
        let lines: Vec<(i64, i64)> =
            sqlx::query_as("SELECT product_id, quantity FROM order_lines WHERE order_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        for (product_id, quantity) in lines {
            // Product may have been deleted since the order; nothing to restore then
            sqlx::query("UPDATE products SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3")
                .bind(quantity)
                .bind(now)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

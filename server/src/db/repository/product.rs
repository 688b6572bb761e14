//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, ProductUpdate};
use sqlx::SqlitePool;

const PRODUCT_SELECT: &str = "SELECT id, name, description, price, stock, image_url, created_at, updated_at FROM products";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let sql = format!("{PRODUCT_SELECT} ORDER BY id ASC");
    let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO products (id, name, description, price, stock, image_url, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.stock)
    .bind(&data.image_url)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE products SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), stock = COALESCE(?4, stock), image_url = COALESCE(?5, image_url), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.stock)
    .bind(&data.image_url)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

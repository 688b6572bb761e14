//! User Repository

use super::{RepoError, RepoResult, is_unique_violation};
use shared::models::{ProfileUpdate, Role, User, UserUpdate};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, name, email, password_hash, role, status, phone, address, created_at, updated_at FROM users";

/// Insert payload; the password is already hashed by the caller
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("{USER_SELECT} ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE LOWER(email) = LOWER(?)");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: NewUser) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let result = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, status, phone, address, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.password_hash)
    .bind(data.role.as_str())
    .bind(&data.phone)
    .bind(&data.address)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                data.email
            )));
        }
        Err(e) => return Err(e.into()),
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Self-service profile update (name/email/phone/address only)
pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    data: ProfileUpdate,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "UPDATE users SET name = COALESCE(?1, name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), address = COALESCE(?4, address), updated_at = ?5 WHERE id = ?6",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await;

    let rows = match result {
        Ok(r) => r,
        Err(e) if is_unique_violation(&e) => {
            return Err(RepoError::Duplicate("Email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    };
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Admin update: any field including role and status
pub async fn update(pool: &SqlitePool, id: i64, data: UserUpdate) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "UPDATE users SET name = COALESCE(?1, name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), address = COALESCE(?4, address), role = COALESCE(?5, role), status = COALESCE(?6, status), updated_at = ?7 WHERE id = ?8",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(data.role.map(|r| r.as_str()))
    .bind(data.status.map(|s| s.as_str()))
    .bind(now)
    .bind(id)
    .execute(pool)
    .await;

    let rows = match result {
        Ok(r) => r,
        Err(e) if is_unique_violation(&e) => {
            return Err(RepoError::Duplicate("Email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    };
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Hard delete. Orders keep their customer snapshot, so history survives.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

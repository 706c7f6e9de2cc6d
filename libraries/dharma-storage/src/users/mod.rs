//! User accounts and credentials

use crate::error::{is_unique_violation, Result, StorageError};
use dharma_core::types::{format_timestamp, now_millis, User, UserId};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    is_admin: bool,
    created_at: i64,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: UserId::new(self.id),
            email: self.email,
            is_admin: self.is_admin,
            created_at: format_timestamp(self.created_at),
        }
    }
}

/// Look up a user and their password hash by email
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<(User, String)>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, is_admin, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| {
        let hash = r.password_hash.clone();
        (r.into_user(), hash)
    }))
}

/// Get a user by ID
pub async fn get_by_id(pool: &SqlitePool, id: UserId) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, is_admin, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserRow::into_user))
}

/// Get all users, oldest first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, is_admin, created_at FROM users ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(UserRow::into_user).collect())
}

/// Insert a user with an already-hashed password
pub async fn insert(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    is_admin: bool,
) -> Result<User> {
    let now = now_millis();

    let result = sqlx::query(
        "INSERT INTO users (email, password_hash, is_admin, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(email)
    .bind(password_hash)
    .bind(is_admin)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| duplicate_email(e, email))?;

    Ok(User {
        id: UserId::new(result.last_insert_rowid()),
        email: email.to_string(),
        is_admin,
        created_at: format_timestamp(now),
    })
}

/// Update the given columns; `None` leaves a column unchanged
pub async fn update(
    pool: &SqlitePool,
    id: UserId,
    email: Option<&str>,
    password_hash: Option<&str>,
    is_admin: Option<bool>,
) -> Result<User> {
    let result = sqlx::query(
        "UPDATE users SET
            email = COALESCE(?, email),
            password_hash = COALESCE(?, password_hash),
            is_admin = COALESCE(?, is_admin)
         WHERE id = ?",
    )
    .bind(email)
    .bind(password_hash)
    .bind(is_admin)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| duplicate_email(e, email.unwrap_or_default()))?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("User", id));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("User", id))
}

/// Delete a user
///
/// Returns `Ok(true)` if a row was deleted
pub async fn delete(pool: &SqlitePool, id: UserId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn duplicate_email(err: sqlx::Error, email: &str) -> StorageError {
    if is_unique_violation(&err) {
        StorageError::Duplicate(format!("Email already registered: {email}"))
    } else {
        StorageError::Database(err)
    }
}

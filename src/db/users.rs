//! Row model and the five CRUD queries for the `users` table.
//!
//! Each function issues exactly one parameterized statement against the
//! shared pool. Id-addressed statements bind the raw path string and cast it
//! server-side, so a malformed id surfaces as a query-level error rather
//! than being rejected in-process.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// A row of the `users` table. `id` is assigned by the database and
/// immutable; both text columns are nullable at the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    /// Server-generated primary key.
    pub id: i32,
    /// Display name, if any.
    pub name: Option<String>,
    /// Email address, if any.
    pub email: Option<String>,
}

/// Request body for create and update. Both fields are optional; an absent
/// field is stored as NULL. Update is full-replace: both columns are always
/// set from this payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

/// Fetch every user.
pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email FROM users")
        .fetch_all(pool)
        .await
}

/// Fetch one user by id. `Ok(None)` means the query succeeded and matched
/// no row.
pub async fn find(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1::text::int4")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Insert a user and return the stored row with its assigned id.
pub async fn create(pool: &PgPool, payload: &UserPayload) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email",
    )
    .bind(payload.name.as_deref())
    .bind(payload.email.as_deref())
    .fetch_one(pool)
    .await
}

/// Overwrite both columns of the addressed row. `Ok(None)` means no row has
/// that id.
pub async fn update(
    pool: &PgPool,
    id: &str,
    payload: &UserPayload,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET name = $1, email = $2 WHERE id = $3::text::int4 \
         RETURNING id, name, email",
    )
    .bind(payload.name.as_deref())
    .bind(payload.email.as_deref())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete the addressed row. `Ok(None)` means no row had that id.
pub async fn delete(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "DELETE FROM users WHERE id = $1::text::int4 RETURNING id, name, email",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

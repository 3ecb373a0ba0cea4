use sqlx::PgPool;

use crate::errors::AppError;
use super::types::{User, NewUser};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    email: String,
    is_superuser: bool,
}

/// Find user by username for authentication. Returns internal User with password hash.
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password, email, is_superuser FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| User {
        id: r.id,
        username: r.username,
        password: r.password,
        email: r.email,
        is_superuser: r.is_superuser,
    }))
}

/// Create a new user. A taken username maps to `AppError::Conflict`.
pub async fn create(pool: &PgPool, new: &NewUser) -> Result<i64, AppError> {
    let result = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, password, email, is_superuser) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&new.username)
    .bind(&new.password)
    .bind(&new.email)
    .bind(new.is_superuser)
    .fetch_one(pool)
    .await;

    match result {
        Ok(id) => Ok(id),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
            format!("Username '{}' is already taken", new.username),
        )),
        Err(e) => Err(AppError::Db(e)),
    }
}

//! Login session database operations
//!
//! Sessions are opaque random tokens. Storing them in the database (with
//! a cascade from `users`) means deleting an account also revokes its
//! active logins.

use crate::auth;
use crate::db::users::{self, User};
use crate::Result;
use sqlx::SqlitePool;

/// Create a session for a user, returning the token to set as a cookie
pub async fn create_session(pool: &SqlitePool, user_id: i64) -> Result<String> {
    let token = auth::generate_session_token();

    sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?, ?)")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolve a session token to its user, if the session is live
pub async fn find_user_by_token(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let user_id: Option<i64> = sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    match user_id {
        Some(id) => users::find_by_id(pool, id).await,
        None => Ok(None),
    }
}

/// Delete a session (logout); unknown tokens are a no-op
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

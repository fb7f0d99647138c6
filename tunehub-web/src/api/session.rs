//! Session extraction from the request cookie
//!
//! `CurrentUser` is an axum extractor: it reads the session cookie,
//! resolves it against the `sessions` table and yields the logged-in
//! user. Routes that take a `CurrentUser` argument therefore reject
//! unauthenticated requests with 401 before the handler body runs.

use crate::api::AppState;
use crate::error::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue};
use tunehub_common::db::{sessions, users::User};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "tunehub_session";

/// The authenticated user behind the current request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Session token, kept so logout can delete the row
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(session_token_from_cookie_header)
            .ok_or_else(|| ApiError::Unauthorized("Please log in first".to_string()))?;

        let user = sessions::find_user_by_token(&state.db, &token)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Unauthorized("Session expired, please log in".to_string()))?;

        Ok(CurrentUser { user, token })
    }
}

fn session_token_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// `Set-Cookie` header establishing a session
///
/// Generated tokens are alphanumeric, so this only fails if handed a
/// token that never came from [`tunehub_common::auth`].
pub fn session_cookie_header(token: &str) -> Result<(HeaderName, HeaderValue), ApiError> {
    let value = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, token);
    let value = HeaderValue::from_str(&value)
        .map_err(|_| ApiError::Internal("Session token is not a valid header value".to_string()))?;
    Ok((SET_COOKIE, value))
}

/// `Set-Cookie` header clearing the session (logout)
pub fn clear_cookie_header() -> (HeaderName, HeaderValue) {
    // Literal duplicates SESSION_COOKIE so the value stays static;
    // test_clear_cookie_targets_session_cookie keeps them in sync
    (
        SET_COOKIE,
        HeaderValue::from_static("tunehub_session=; Max-Age=0; HttpOnly; Path=/"),
    )
}

//! Authentication routes: registration, login, logout, profile
//!
//! Logins create a row in the `sessions` table and return the token in
//! an HttpOnly cookie. Admin accounts sign in through the dedicated
//! `/admin/login` route.

use crate::api::session::{clear_cookie_header, session_cookie_header, CurrentUser};
use crate::api::AppState;
use crate::error::{ApiError, ApiResult};
use axum::extract::State;
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use tunehub_common::db::{sessions, users};
use tunehub_common::{auth, policy, Role};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin/login", post(admin_login))
        .route("/logout", post(logout))
        .route("/profile", post(change_password))
        .route("/become_creator", post(become_creator))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
    /// "listener" (or legacy "user") or "creator"
    role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    status: String,
    username: String,
    role: Role,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    new_password: String,
}

/// POST /register - Create an account and log it in
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.username.is_empty() || req.password.is_empty() || req.role.is_empty() {
        return Err(ApiError::BadRequest(
            "Username, password, and role are required".to_string(),
        ));
    }

    let role = Role::parse(&req.role).map_err(ApiError::from)?;
    if role == Role::Admin {
        return Err(ApiError::BadRequest(
            "The admin role cannot be self-assigned".to_string(),
        ));
    }

    let hash = auth::generate_password_hash(&req.password);
    let user_id = users::create_user(&state.db, &req.username, &hash, role).await?;
    let token = sessions::create_session(&state.db, user_id).await?;

    info!("Registered new {} account: {}", role, req.username);

    Ok((
        AppendHeaders([session_cookie_header(&token)?]),
        Json(SessionResponse {
            status: "registered".to_string(),
            username: req.username,
            role,
        }),
    ))
}

/// POST /login - Sign in a listener or creator account
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = verify_credentials(&state, &req).await?;

    if user.role == Role::Admin {
        return Err(ApiError::Forbidden(
            "Administrators must sign in at /admin/login".to_string(),
        ));
    }

    let token = sessions::create_session(&state.db, user.id).await?;
    info!("User logged in: {}", user.username);

    Ok((
        AppendHeaders([session_cookie_header(&token)?]),
        Json(SessionResponse {
            status: "logged_in".to_string(),
            username: user.username,
            role: user.role,
        }),
    ))
}

/// POST /admin/login - Sign in the administrator
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = verify_credentials(&state, &req).await?;
    policy::require_role(&user, Role::Admin).map_err(ApiError::from)?;

    let token = sessions::create_session(&state.db, user.id).await?;
    info!("Admin logged in: {}", user.username);

    Ok((
        AppendHeaders([session_cookie_header(&token)?]),
        Json(SessionResponse {
            status: "logged_in".to_string(),
            username: user.username,
            role: user.role,
        }),
    ))
}

async fn verify_credentials(
    state: &AppState,
    req: &LoginRequest,
) -> ApiResult<tunehub_common::db::users::User> {
    let user = users::find_by_username(&state.db, &req.username).await?;

    match user {
        Some(user) if auth::check_password_hash(&user.password_hash, &req.password) => Ok(user),
        _ => Err(ApiError::Unauthorized(
            "Incorrect username or password".to_string(),
        )),
    }
}

/// POST /logout - Delete the current session
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    sessions::delete_session(&state.db, &current.token).await?;

    Ok((
        AppendHeaders([clear_cookie_header()]),
        Json(StatusResponse {
            status: "logged_out".to_string(),
            message: format!("Goodbye, {}", current.user.username),
        }),
    ))
}

/// POST /profile - Change the current user's password
pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<StatusResponse>> {
    if req.new_password.is_empty() {
        return Err(ApiError::BadRequest("New password is required".to_string()));
    }

    let hash = auth::generate_password_hash(&req.new_password);
    users::update_password(&state.db, current.user.id, &hash).await?;

    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        message: "Password updated successfully".to_string(),
    }))
}

/// POST /become_creator - Upgrade a listener account to creator
pub async fn become_creator(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<StatusResponse>> {
    if current.user.role == Role::Creator {
        return Ok(Json(StatusResponse {
            status: "ok".to_string(),
            message: "You are already a creator".to_string(),
        }));
    }
    policy::require_role(&current.user, Role::Listener).map_err(ApiError::from)?;

    users::update_role(&state.db, current.user.id, Role::Creator).await?;
    info!("User {} became a creator", current.user.username);

    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        message: "You are now a creator".to_string(),
    }))
}

//! Admin routes: dashboard statistics and account/catalog management
//!
//! All routes here require the admin role. Aggregates are computed on
//! demand by grouping over the live tables; nothing is cached.

use crate::api::session::CurrentUser;
use crate::api::AppState;
use crate::error::{ApiError, ApiResult};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use tunehub_common::db::songs::{GenreCount, Song};
use tunehub_common::db::{albums, songs, users};
use tunehub_common::{auth, policy, Role};

/// Minimum length enforced for new admin passwords
const MIN_ADMIN_PASSWORD_LEN: usize = 8;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin_dashboard", get(admin_dashboard))
        .route("/admin/manage_all_songs", get(manage_all_songs))
        .route("/admin/delete_user/:user_id", post(delete_user))
        .route("/change_admin_password", post(change_admin_password))
}

#[derive(Debug, Serialize)]
pub struct AdminDashboardResponse {
    total_listeners: i64,
    total_creators: i64,
    total_tracks: i64,
    total_albums: i64,
    genre_counts: Vec<GenreCount>,
    /// Label/data pairs preshaped for the dashboard chart
    chart_data: ChartData,
}

#[derive(Debug, Serialize)]
pub struct ChartData {
    labels: Vec<String>,
    data: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct SongListResponse {
    songs: Vec<Song>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeAdminPasswordRequest {
    new_password: String,
    confirm_password: String,
}

/// GET /admin_dashboard - Aggregate usage statistics
pub async fn admin_dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<AdminDashboardResponse>> {
    policy::require_role(&current.user, Role::Admin).map_err(ApiError::from)?;

    let total_listeners = users::count_by_role(&state.db, Role::Listener).await?;
    let total_creators = users::count_by_role(&state.db, Role::Creator).await?;
    let total_tracks = songs::total_count(&state.db).await?;
    let total_albums = albums::total_count(&state.db).await?;
    let genre_counts = songs::genre_counts(&state.db).await?;

    let chart_data = ChartData {
        labels: genre_counts.iter().map(|g| g.genre.clone()).collect(),
        data: genre_counts.iter().map(|g| g.count).collect(),
    };

    Ok(Json(AdminDashboardResponse {
        total_listeners,
        total_creators,
        total_tracks,
        total_albums,
        genre_counts,
        chart_data,
    }))
}

/// GET /admin/manage_all_songs - Every song in the catalog
pub async fn manage_all_songs(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<SongListResponse>> {
    policy::require_role(&current.user, Role::Admin).map_err(ApiError::from)?;

    let all = songs::list_all(&state.db).await?;
    Ok(Json(SongListResponse { songs: all }))
}

/// POST /admin/delete_user/:id - Remove an account and everything it owns
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    current: CurrentUser,
) -> ApiResult<Json<StatusResponse>> {
    policy::require_role(&current.user, Role::Admin).map_err(ApiError::from)?;

    let target = users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No user with id {}", user_id)))?;

    if target.role == Role::Admin {
        return Err(ApiError::BadRequest(
            "Admin accounts cannot be deleted".to_string(),
        ));
    }

    users::delete_user(&state.db, user_id).await?;
    info!(
        "Admin {} deleted account {} ({})",
        current.user.username, target.username, user_id
    );

    Ok(Json(StatusResponse {
        status: "deleted".to_string(),
        message: format!("Account {} and all owned content removed", target.username),
    }))
}

/// POST /change_admin_password - Change the admin's own password
pub async fn change_admin_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<ChangeAdminPasswordRequest>,
) -> ApiResult<Json<StatusResponse>> {
    policy::require_role(&current.user, Role::Admin).map_err(ApiError::from)?;

    if req.new_password.len() < MIN_ADMIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_ADMIN_PASSWORD_LEN
        )));
    }
    if req.new_password != req.confirm_password {
        return Err(ApiError::BadRequest("Passwords must match".to_string()));
    }

    let hash = auth::generate_password_hash(&req.new_password);
    users::update_password(&state.db, current.user.id, &hash).await?;

    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        message: "Admin password changed successfully!".to_string(),
    }))
}

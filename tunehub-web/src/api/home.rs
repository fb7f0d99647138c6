//! Homepage data routes for listeners and creators

use crate::api::session::CurrentUser;
use crate::api::AppState;
use crate::error::{ApiError, ApiResult};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tunehub_common::db::albums::Album;
use tunehub_common::db::playlists::Playlist;
use tunehub_common::db::ratings::CreatorStats;
use tunehub_common::db::songs::Song;
use tunehub_common::db::{albums, playlists, ratings, songs};
use tunehub_common::{policy, Role};

/// How many recent tracks/albums the homepage recommends
const RECOMMENDATION_LIMIT: i64 = 3;

pub fn home_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(user_homepage))
        .route("/creator", get(creator_homepage))
        .route("/creator_dashboard", get(creator_dashboard))
}

#[derive(Debug, Serialize)]
pub struct UserHomepageResponse {
    username: String,
    role: Role,
    recommended_tracks: Vec<Song>,
    recommended_albums: Vec<Album>,
    playlists: Vec<Playlist>,
}

#[derive(Debug, Serialize)]
pub struct CreatorHomepageResponse {
    username: String,
    total_songs: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatorDashboardResponse {
    username: String,
    stats: CreatorStats,
    songs: Vec<Song>,
}

/// GET /user - Listener homepage: recent uploads, recent albums, own playlists
pub async fn user_homepage(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<UserHomepageResponse>> {
    let recommended_tracks = songs::recent(&state.db, RECOMMENDATION_LIMIT).await?;
    let recommended_albums = albums::recent(&state.db, RECOMMENDATION_LIMIT).await?;
    let user_playlists = playlists::list_by_user(&state.db, current.user.id).await?;

    Ok(Json(UserHomepageResponse {
        username: current.user.username,
        role: current.user.role,
        recommended_tracks,
        recommended_albums,
        playlists: user_playlists,
    }))
}

/// GET /creator - Creator homepage gate
pub async fn creator_homepage(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<CreatorHomepageResponse>> {
    policy::require_role(&current.user, Role::Creator).map_err(ApiError::from)?;

    let own = songs::list_by_user(&state.db, current.user.id).await?;

    Ok(Json(CreatorHomepageResponse {
        username: current.user.username,
        total_songs: own.len() as i64,
    }))
}

/// GET /creator_dashboard - Per-creator statistics and catalog
pub async fn creator_dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<CreatorDashboardResponse>> {
    policy::require_role(&current.user, Role::Creator).map_err(ApiError::from)?;

    let stats = ratings::creator_stats(&state.db, current.user.id).await?;
    let own = songs::list_by_user(&state.db, current.user.id).await?;

    Ok(Json(CreatorDashboardResponse {
        username: current.user.username,
        stats,
        songs: own,
    }))
}

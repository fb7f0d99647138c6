//! Playlist routes: creation, viewing, renaming, adding songs

use crate::api::session::CurrentUser;
use crate::api::AppState;
use crate::error::{ApiError, ApiResult};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tunehub_common::db::playlists::{self, Playlist};
use tunehub_common::db::songs::{self, Song};
use tunehub_common::{policy, Role};

pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/create_playlist", post(create_playlist))
        .route("/playlists", get(list_playlists))
        .route("/show_playlist/:playlist_id", get(show_playlist))
        .route("/edit_playlist/:playlist_id", post(edit_playlist))
        .route("/add_to_playlist/:song_id", post(add_to_playlist))
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    name: String,
    #[serde(default)]
    song_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EditPlaylistRequest {
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddToPlaylistRequest {
    playlist_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    status: String,
    playlist_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PlaylistListResponse {
    playlists: Vec<Playlist>,
}

#[derive(Debug, Serialize)]
pub struct ShowPlaylistResponse {
    playlist: Playlist,
    songs: Vec<Song>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
    message: String,
}

/// POST /create_playlist - Build a playlist from existing songs
pub async fn create_playlist(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreatePlaylistRequest>,
) -> ApiResult<Json<PlaylistResponse>> {
    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Playlist name is required".to_string()));
    }
    if req.song_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "Please select at least one song for the playlist".to_string(),
        ));
    }

    let playlist_id =
        playlists::create_playlist(&state.db, &req.name, current.user.id, &req.song_ids).await?;

    Ok(Json(PlaylistResponse {
        status: "created".to_string(),
        playlist_id,
    }))
}

/// GET /playlists - The current user's playlists
pub async fn list_playlists(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<PlaylistListResponse>> {
    let own = playlists::list_by_user(&state.db, current.user.id).await?;
    Ok(Json(PlaylistListResponse { playlists: own }))
}

/// GET /show_playlist/:id - Playlist contents, visible to anyone
pub async fn show_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<i64>,
) -> ApiResult<Json<ShowPlaylistResponse>> {
    let playlist = playlists::get_playlist(&state.db, playlist_id).await?;
    let playlist_songs = playlists::songs_in_playlist(&state.db, playlist_id).await?;

    Ok(Json(ShowPlaylistResponse {
        playlist,
        songs: playlist_songs,
    }))
}

/// POST /edit_playlist/:id - Owner renames a playlist
pub async fn edit_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<i64>,
    current: CurrentUser,
    Json(req): Json<EditPlaylistRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let playlist = playlists::get_playlist(&state.db, playlist_id).await?;
    policy::ensure_owner(&current.user, playlist.user_id).map_err(ApiError::from)?;

    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Playlist name is required".to_string()));
    }

    playlists::rename_playlist(&state.db, playlist_id, &req.name).await?;

    Ok(Json(StatusResponse {
        status: "updated".to_string(),
        message: "Playlist renamed".to_string(),
    }))
}

/// POST /add_to_playlist/:song_id - Listener adds a song to an own playlist
pub async fn add_to_playlist(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
    current: CurrentUser,
    Json(req): Json<AddToPlaylistRequest>,
) -> ApiResult<Json<StatusResponse>> {
    policy::require_role(&current.user, Role::Listener).map_err(ApiError::from)?;

    songs::get_song(&state.db, song_id).await?;

    // Only the owner's playlists are addressable here; a foreign playlist
    // id reads the same as a missing one.
    let playlist = playlists::find_playlist(&state.db, req.playlist_id)
        .await?
        .filter(|p| p.user_id == current.user.id)
        .ok_or_else(|| {
            ApiError::NotFound(
                "Playlist not found or you do not have permission to add to this playlist"
                    .to_string(),
            )
        })?;

    playlists::add_song(&state.db, playlist.id, song_id).await?;

    Ok(Json(StatusResponse {
        status: "added".to_string(),
        message: "Song successfully added to the playlist!".to_string(),
    }))
}

//! Album routes: creation and viewing

use crate::api::session::CurrentUser;
use crate::api::AppState;
use crate::error::{ApiError, ApiResult};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tunehub_common::db::albums::{self, Album};
use tunehub_common::db::songs::Song;
use tunehub_common::{policy, Role};

pub fn album_routes() -> Router<AppState> {
    Router::new()
        .route("/make_album", post(make_album))
        .route("/view_album/:album_id", get(view_album))
}

#[derive(Debug, Deserialize)]
pub struct MakeAlbumRequest {
    name: String,
    #[serde(default)]
    song_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AlbumResponse {
    status: String,
    message: String,
    album_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ViewAlbumResponse {
    album: Album,
    songs: Vec<Song>,
}

/// POST /make_album - Creator assembles an album from their own songs
pub async fn make_album(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<MakeAlbumRequest>,
) -> ApiResult<Json<AlbumResponse>> {
    policy::require_role(&current.user, Role::Creator).map_err(ApiError::from)?;

    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Album name is required".to_string()));
    }
    if req.song_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "Please select at least one song for the album".to_string(),
        ));
    }

    let album_id =
        albums::create_album(&state.db, &req.name, current.user.id, &req.song_ids).await?;

    Ok(Json(AlbumResponse {
        status: "created".to_string(),
        message: "Album successfully created!".to_string(),
        album_id,
    }))
}

/// GET /view_album/:id - Album contents, visible to anyone
pub async fn view_album(
    State(state): State<AppState>,
    Path(album_id): Path<i64>,
) -> ApiResult<Json<ViewAlbumResponse>> {
    let album = albums::get_album(&state.db, album_id).await?;
    let album_songs = albums::songs_in_album(&state.db, album_id).await?;

    Ok(Json(ViewAlbumResponse {
        album,
        songs: album_songs,
    }))
}

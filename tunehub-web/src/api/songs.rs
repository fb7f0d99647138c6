//! Song routes: upload, edit, delete, details, search, lyrics
//!
//! Uploads are multipart: one audio file part plus metadata fields. The
//! file is saved under the configured upload directory keyed by its
//! original filename; the song row records the submitted metadata with
//! the uploading creator as artist.

use crate::api::session::CurrentUser;
use crate::api::AppState;
use crate::error::{ApiError, ApiResult};
use axum::extract::{Multipart, Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tunehub_common::db::ratings::Rating;
use tunehub_common::db::songs::{NewSong, Song, SongEdit};
use tunehub_common::db::{ratings, songs};
use tunehub_common::{policy, Role};

/// File extensions accepted for upload
const ALLOWED_EXTENSIONS: &[&str] = &["mp3"];

pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/songs/:song_id", get(song_details))
        .route("/edit_song/:song_id", post(edit_song))
        .route("/delete_song/:song_id", post(delete_song))
        .route("/search_results", get(search_results))
        .route("/manage_songs", get(manage_songs))
        .route("/read_lyrics/:song_id", get(read_lyrics))
        .route("/edit_lyrics/:song_id", post(edit_lyrics))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    status: String,
    message: String,
    song_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SongDetailsResponse {
    song: Song,
    ratings: Vec<Rating>,
    average_rating: f64,
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
pub struct EditSongRequest {
    title: String,
    singer: Option<String>,
    genre: String,
    lyrics: Option<String>,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
pub struct LyricsRequest {
    lyrics: String,
}

#[derive(Debug, Serialize)]
pub struct LyricsResponse {
    song_id: i64,
    title: String,
    lyrics: Option<String>,
}

/// Accumulates multipart fields as they stream in
#[derive(Debug, Default)]
struct UploadForm {
    filename: Option<String>,
    file_bytes: Option<Vec<u8>>,
    title: Option<String>,
    singer: Option<String>,
    genre: Option<String>,
    lyrics: Option<String>,
    release_date: Option<String>,
}

/// POST /upload - Creator uploads an audio file with metadata
pub async fn upload(
    State(state): State<AppState>,
    current: CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    policy::require_role(&current.user, Role::Creator).map_err(ApiError::from)?;

    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                form.file_bytes = Some(bytes.to_vec());
            }
            other => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Malformed field: {}", e)))?;
                match other {
                    "title" => form.title = Some(text),
                    "singer" => form.singer = Some(text),
                    "genre" => form.genre = Some(text),
                    "lyrics" => form.lyrics = Some(text),
                    "release_date" => form.release_date = Some(text),
                    unknown => warn!("Ignoring unknown upload field: {}", unknown),
                }
            }
        }
    }

    let filename = form
        .filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::BadRequest("An audio file is required".to_string()))?;
    let file_bytes = form
        .file_bytes
        .ok_or_else(|| ApiError::BadRequest("An audio file is required".to_string()))?;

    validate_upload_filename(&filename)?;

    let title = form
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;
    let genre = form
        .genre
        .filter(|g| !g.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Genre is required".to_string()))?;
    let release_date = validate_release_date(form.release_date)?;

    tokio::fs::create_dir_all(&state.upload_dir).await?;

    // Insert the row before writing the file. The upload folder is shared
    // and keyed by original filename, and the UNIQUE filename column
    // rejects a concurrent duplicate at the insert, so a collision gets a
    // 409 instead of clobbering another creator's file.
    let song_id = songs::insert_song(
        &state.db,
        &NewSong {
            filename: filename.clone(),
            title,
            singer: form.singer.filter(|s| !s.is_empty()),
            artist: current.user.username.clone(),
            genre,
            lyrics: form.lyrics.filter(|l| !l.is_empty()),
            release_date,
            user_id: current.user.id,
        },
    )
    .await?;

    let file_path = state.upload_dir.join(&filename);
    if let Err(e) = tokio::fs::write(&file_path, &file_bytes).await {
        // Roll the row back so the catalog never lists a file that was
        // never stored
        songs::delete_song(&state.db, song_id).await?;
        return Err(e.into());
    }

    info!(
        "Song {} uploaded by {} ({} bytes)",
        song_id,
        current.user.username,
        file_bytes.len()
    );

    Ok(Json(UploadResponse {
        status: "uploaded".to_string(),
        message: "Song successfully uploaded!".to_string(),
        song_id,
    }))
}

fn validate_upload_filename(filename: &str) -> ApiResult<()> {
    // Bare filename only: path separators would escape the upload folder
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ApiError::BadRequest("Invalid filename".to_string()));
    }

    let allowed = filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !allowed {
        return Err(ApiError::BadRequest(
            "Only .mp3 files can be uploaded".to_string(),
        ));
    }
    Ok(())
}

fn validate_release_date(value: Option<String>) -> ApiResult<Option<String>> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => match NaiveDate::parse_from_str(&v, "%Y-%m-%d") {
            Ok(_) => Ok(Some(v)),
            Err(_) => Err(ApiError::BadRequest(
                "Release date must be YYYY-MM-DD".to_string(),
            )),
        },
    }
}

/// GET /songs/:id - Song details with ratings and live average
pub async fn song_details(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
) -> ApiResult<Json<SongDetailsResponse>> {
    let song = songs::get_song(&state.db, song_id).await?;
    let song_ratings = ratings::ratings_for_song(&state.db, song_id).await?;
    let average_rating = ratings::average_for_song(&state.db, song_id).await?;

    Ok(Json(SongDetailsResponse {
        song,
        ratings: song_ratings,
        average_rating,
    }))
}

/// POST /edit_song/:id - Owner edits song metadata
pub async fn edit_song(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
    current: CurrentUser,
    Json(req): Json<EditSongRequest>,
) -> ApiResult<Json<StatusResponse>> {
    policy::require_role(&current.user, Role::Creator).map_err(ApiError::from)?;

    let song = songs::get_song(&state.db, song_id).await?;
    policy::ensure_song_owner(&current.user, &song).map_err(ApiError::from)?;

    if req.title.is_empty() || req.genre.is_empty() {
        return Err(ApiError::BadRequest(
            "Title and genre are required".to_string(),
        ));
    }
    let release_date = validate_release_date(req.release_date)?;

    songs::update_song(
        &state.db,
        song_id,
        &SongEdit {
            title: req.title,
            singer: req.singer.filter(|s| !s.is_empty()),
            genre: req.genre,
            lyrics: req.lyrics.filter(|l| !l.is_empty()),
            release_date,
        },
    )
    .await?;

    Ok(Json(StatusResponse {
        status: "updated".to_string(),
        message: "Song details successfully updated!".to_string(),
    }))
}

/// POST /delete_song/:id - Owner or admin deletes a song and its file
pub async fn delete_song(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
    current: CurrentUser,
) -> ApiResult<Json<StatusResponse>> {
    policy::require_any_role(&current.user, &[Role::Creator, Role::Admin])
        .map_err(ApiError::from)?;

    let song = songs::get_song(&state.db, song_id).await?;
    policy::ensure_song_manager(&current.user, &song).map_err(ApiError::from)?;

    let file_path = state.upload_dir.join(&song.filename);
    if file_path.exists() {
        tokio::fs::remove_file(&file_path).await?;
    }

    songs::delete_song(&state.db, song_id).await?;
    info!("Song {} deleted by {}", song_id, current.user.username);

    Ok(Json(StatusResponse {
        status: "deleted".to_string(),
        message: "Song deleted".to_string(),
    }))
}

/// GET /search_results?query= - Case-insensitive title search
pub async fn search_results(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<SongListResponse>> {
    let matching = songs::search_by_title(&state.db, &params.query).await?;
    Ok(Json(SongListResponse { songs: matching }))
}

/// GET /manage_songs - Creator's own catalog
pub async fn manage_songs(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<SongListResponse>> {
    policy::require_role(&current.user, Role::Creator).map_err(ApiError::from)?;

    let own = songs::list_by_user(&state.db, current.user.id).await?;
    Ok(Json(SongListResponse { songs: own }))
}

/// GET /read_lyrics/:id - Anyone may read lyrics
pub async fn read_lyrics(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
) -> ApiResult<Json<LyricsResponse>> {
    let song = songs::get_song(&state.db, song_id).await?;
    Ok(Json(LyricsResponse {
        song_id: song.id,
        title: song.title,
        lyrics: song.lyrics,
    }))
}

/// POST /edit_lyrics/:id - Owner updates lyrics
pub async fn edit_lyrics(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
    current: CurrentUser,
    Json(req): Json<LyricsRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let song = songs::get_song(&state.db, song_id).await?;
    policy::ensure_song_owner(&current.user, &song).map_err(ApiError::from)?;

    songs::update_lyrics(&state.db, song_id, &req.lyrics).await?;

    Ok(Json(StatusResponse {
        status: "updated".to_string(),
        message: "Lyrics updated successfully!".to_string(),
    }))
}

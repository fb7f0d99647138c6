//! Song database operations

use crate::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;

/// Song record
///
/// `rating` is the stored running average, kept equal to the mean of the
/// song's rows in `ratings` by [`crate::db::ratings::rate_song`].
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Song {
    pub id: i64,
    pub filename: String,
    pub title: String,
    pub singer: Option<String>,
    pub artist: String,
    pub genre: String,
    pub lyrics: Option<String>,
    pub release_date: Option<String>,
    pub user_id: i64,
    pub rating: f64,
    pub created_at: String,
}

/// Fields supplied when a creator uploads a song
#[derive(Debug, Clone)]
pub struct NewSong {
    pub filename: String,
    pub title: String,
    pub singer: Option<String>,
    pub artist: String,
    pub genre: String,
    pub lyrics: Option<String>,
    pub release_date: Option<String>,
    pub user_id: i64,
}

/// Metadata fields a creator may edit after upload
#[derive(Debug, Clone)]
pub struct SongEdit {
    pub title: String,
    pub singer: Option<String>,
    pub genre: String,
    pub lyrics: Option<String>,
    pub release_date: Option<String>,
}

/// Per-genre song count (admin dashboard chart)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GenreCount {
    pub genre: String,
    pub count: i64,
}

const SONG_COLUMNS: &str = "id, filename, title, singer, artist, genre, lyrics, \
                            release_date, user_id, rating, created_at";

pub async fn insert_song(pool: &SqlitePool, song: &NewSong) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO songs (filename, title, singer, artist, genre, lyrics, release_date, user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&song.filename)
    .bind(&song.title)
    .bind(&song.singer)
    .bind(&song.artist)
    .bind(&song.genre)
    .bind(&song.lyrics)
    .bind(&song.release_date)
    .bind(song.user_id)
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(Error::Conflict(format!(
            "A song file named '{}' already exists",
            song.filename
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn find_song(pool: &SqlitePool, id: i64) -> Result<Option<Song>> {
    let song = sqlx::query_as::<_, Song>(&format!(
        "SELECT {} FROM songs WHERE id = ?",
        SONG_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(song)
}

/// Fetch a song or fail with `Error::NotFound`
pub async fn get_song(pool: &SqlitePool, id: i64) -> Result<Song> {
    find_song(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No song with id {}", id)))
}

pub async fn update_song(pool: &SqlitePool, id: i64, edit: &SongEdit) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE songs
        SET title = ?, singer = ?, genre = ?, lyrics = ?, release_date = ?
        WHERE id = ?
        "#,
    )
    .bind(&edit.title)
    .bind(&edit.singer)
    .bind(&edit.genre)
    .bind(&edit.lyrics)
    .bind(&edit.release_date)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_lyrics(pool: &SqlitePool, id: i64, lyrics: &str) -> Result<()> {
    sqlx::query("UPDATE songs SET lyrics = ? WHERE id = ?")
        .bind(lyrics)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a song; rating and membership rows cascade
pub async fn delete_song(pool: &SqlitePool, id: i64) -> Result<()> {
    let done = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if done.rows_affected() == 0 {
        return Err(Error::NotFound(format!("No song with id {}", id)));
    }
    Ok(())
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(&format!(
        "SELECT {} FROM songs ORDER BY created_at DESC",
        SONG_COLUMNS
    ))
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(&format!(
        "SELECT {} FROM songs WHERE user_id = ? ORDER BY created_at DESC",
        SONG_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

/// Most recently uploaded songs (listener homepage recommendations)
pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(&format!(
        "SELECT {} FROM songs ORDER BY created_at DESC, id DESC LIMIT ?",
        SONG_COLUMNS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

/// Case-insensitive title substring search
pub async fn search_by_title(pool: &SqlitePool, query: &str) -> Result<Vec<Song>> {
    let pattern = format!("%{}%", query);
    let songs = sqlx::query_as::<_, Song>(&format!(
        "SELECT {} FROM songs WHERE title LIKE ? ORDER BY title",
        SONG_COLUMNS
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

pub async fn total_count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Song counts grouped by genre, computed on demand
pub async fn genre_counts(pool: &SqlitePool) -> Result<Vec<GenreCount>> {
    let counts = sqlx::query_as::<_, GenreCount>(
        "SELECT genre, COUNT(*) AS count FROM songs GROUP BY genre ORDER BY genre",
    )
    .fetch_all(pool)
    .await?;
    Ok(counts)
}

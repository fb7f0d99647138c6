//! Playlist database operations

use crate::db::songs::Song;
use crate::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;

/// Named song collection owned by a listener or creator
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// Create a playlist with an initial set of songs
///
/// All given songs must exist; the whole creation is one transaction.
pub async fn create_playlist(
    pool: &SqlitePool,
    name: &str,
    user_id: i64,
    song_ids: &[i64],
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let done = sqlx::query("INSERT INTO playlists (name, user_id) VALUES (?, ?)")
        .bind(name)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    let playlist_id = done.last_insert_rowid();

    for song_id in song_ids {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM songs WHERE id = ?")
            .bind(song_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound(format!("No song with id {}", song_id)));
        }

        sqlx::query("INSERT OR IGNORE INTO playlist_songs (playlist_id, song_id) VALUES (?, ?)")
            .bind(playlist_id)
            .bind(song_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(playlist_id)
}

pub async fn find_playlist(pool: &SqlitePool, id: i64) -> Result<Option<Playlist>> {
    let playlist =
        sqlx::query_as::<_, Playlist>("SELECT id, name, user_id FROM playlists WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(playlist)
}

/// Fetch a playlist or fail with `Error::NotFound`
pub async fn get_playlist(pool: &SqlitePool, id: i64) -> Result<Playlist> {
    find_playlist(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No playlist with id {}", id)))
}

pub async fn rename_playlist(pool: &SqlitePool, id: i64, name: &str) -> Result<()> {
    sqlx::query("UPDATE playlists SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Playlist>> {
    let playlists = sqlx::query_as::<_, Playlist>(
        "SELECT id, name, user_id FROM playlists WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(playlists)
}

pub async fn songs_in_playlist(pool: &SqlitePool, playlist_id: i64) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(
        r#"
        SELECT s.id, s.filename, s.title, s.singer, s.artist, s.genre, s.lyrics,
               s.release_date, s.user_id, s.rating, s.created_at
        FROM songs s
        JOIN playlist_songs ps ON ps.song_id = s.id
        WHERE ps.playlist_id = ?
        ORDER BY s.id
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

/// Add a song to an existing playlist (already present is a no-op)
pub async fn add_song(pool: &SqlitePool, playlist_id: i64, song_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO playlist_songs (playlist_id, song_id) VALUES (?, ?)")
        .bind(playlist_id)
        .bind(song_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_by_user(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlists WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

//! Album database operations

use crate::db::songs::Song;
use crate::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;

/// Named song collection assembled by a creator from their own catalog
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Album {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// Create an album from songs the creator owns
///
/// Songs not owned by the creator are skipped rather than rejected,
/// matching the upload form which only offers the creator's catalog.
pub async fn create_album(
    pool: &SqlitePool,
    name: &str,
    user_id: i64,
    song_ids: &[i64],
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let done = sqlx::query("INSERT INTO albums (name, user_id) VALUES (?, ?)")
        .bind(name)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    let album_id = done.last_insert_rowid();

    for song_id in song_ids {
        let owner: Option<i64> = sqlx::query_scalar("SELECT user_id FROM songs WHERE id = ?")
            .bind(song_id)
            .fetch_optional(&mut *tx)
            .await?;

        if owner == Some(user_id) {
            sqlx::query("INSERT OR IGNORE INTO album_songs (album_id, song_id) VALUES (?, ?)")
                .bind(album_id)
                .bind(song_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(album_id)
}

pub async fn find_album(pool: &SqlitePool, id: i64) -> Result<Option<Album>> {
    let album = sqlx::query_as::<_, Album>("SELECT id, name, user_id FROM albums WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(album)
}

/// Fetch an album or fail with `Error::NotFound`
pub async fn get_album(pool: &SqlitePool, id: i64) -> Result<Album> {
    find_album(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No album with id {}", id)))
}

pub async fn songs_in_album(pool: &SqlitePool, album_id: i64) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(
        r#"
        SELECT s.id, s.filename, s.title, s.singer, s.artist, s.genre, s.lyrics,
               s.release_date, s.user_id, s.rating, s.created_at
        FROM songs s
        JOIN album_songs als ON als.song_id = s.id
        WHERE als.album_id = ?
        ORDER BY s.id
        "#,
    )
    .bind(album_id)
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

/// Most recently created albums (listener homepage recommendations)
pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Album>> {
    let albums = sqlx::query_as::<_, Album>(
        "SELECT id, name, user_id FROM albums ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(albums)
}

pub async fn total_count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM albums")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

//! Rating persistence and aggregation
//!
//! The stored `songs.rating` column must equal the mean of the song's
//! rows in `ratings` at all times. `rate_song` keeps that invariant by
//! inserting the rating row and recomputing the average inside a single
//! transaction, with the average computed by the database itself, so two
//! concurrent ratings cannot produce a lost update.

use crate::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;

/// A single (user, song, value) rating row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub song_id: i64,
    pub rating: i64,
}

/// Outcome of a rating attempt
///
/// A repeat rating by the same user is a notice, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RateOutcome {
    /// Rating recorded; carries the new stored average
    Recorded { average: f64 },
    /// The user had already rated this song; nothing changed
    AlreadyRated,
}

/// Per-creator statistics, computed on demand (creator dashboard)
#[derive(Debug, Clone, Serialize)]
pub struct CreatorStats {
    pub total_songs: i64,
    pub total_ratings: i64,
    pub average_rating: f64,
    pub total_albums: i64,
}

/// Record a rating for a song and update the stored average
///
/// The caller is responsible for validating the rating value range and
/// that the song exists.
pub async fn rate_song(
    pool: &SqlitePool,
    song_id: i64,
    user_id: i64,
    value: i64,
) -> Result<RateOutcome> {
    let mut tx = pool.begin().await?;

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM ratings WHERE user_id = ? AND song_id = ?")
            .bind(user_id)
            .bind(song_id)
            .fetch_optional(&mut *tx)
            .await?;

    if existing.is_some() {
        return Ok(RateOutcome::AlreadyRated);
    }

    let inserted = sqlx::query("INSERT INTO ratings (user_id, song_id, rating) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(song_id)
        .bind(value)
        .execute(&mut *tx)
        .await;

    match inserted {
        Ok(_) => {}
        // UNIQUE(user_id, song_id) backstops a concurrent first rating
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Ok(RateOutcome::AlreadyRated);
        }
        Err(e) => return Err(e.into()),
    }

    // Recompute from the rating rows rather than read-modify-write the
    // stored value, so the average can never drift from the true mean.
    sqlx::query(
        r#"
        UPDATE songs
        SET rating = (SELECT AVG(rating) FROM ratings WHERE song_id = ?1)
        WHERE id = ?1
        "#,
    )
    .bind(song_id)
    .execute(&mut *tx)
    .await?;

    let average: f64 = sqlx::query_scalar("SELECT rating FROM songs WHERE id = ?")
        .bind(song_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No song with id {}", song_id)))?;

    tx.commit().await?;

    Ok(RateOutcome::Recorded { average })
}

pub async fn ratings_for_song(pool: &SqlitePool, song_id: i64) -> Result<Vec<Rating>> {
    let ratings = sqlx::query_as::<_, Rating>(
        "SELECT id, user_id, song_id, rating FROM ratings WHERE song_id = ? ORDER BY id",
    )
    .bind(song_id)
    .fetch_all(pool)
    .await?;
    Ok(ratings)
}

pub async fn find_rating(
    pool: &SqlitePool,
    user_id: i64,
    song_id: i64,
) -> Result<Option<Rating>> {
    let rating = sqlx::query_as::<_, Rating>(
        "SELECT id, user_id, song_id, rating FROM ratings WHERE user_id = ? AND song_id = ?",
    )
    .bind(user_id)
    .bind(song_id)
    .fetch_optional(pool)
    .await?;
    Ok(rating)
}

/// Mean rating computed live from the rating rows (0.0 when unrated)
pub async fn average_for_song(pool: &SqlitePool, song_id: i64) -> Result<f64> {
    let avg: Option<f64> = sqlx::query_scalar("SELECT AVG(rating) FROM ratings WHERE song_id = ?")
        .bind(song_id)
        .fetch_one(pool)
        .await?;
    Ok(avg.unwrap_or(0.0))
}

/// Aggregate statistics over one creator's catalog
pub async fn creator_stats(pool: &SqlitePool, user_id: i64) -> Result<CreatorStats> {
    let total_songs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let (total_ratings, average_rating): (i64, Option<f64>) = sqlx::query_as(
        r#"
        SELECT COUNT(r.id), AVG(r.rating)
        FROM ratings r
        JOIN songs s ON s.id = r.song_id
        WHERE s.user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let total_albums: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM albums WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(CreatorStats {
        total_songs,
        total_ratings,
        average_rating: average_rating.unwrap_or(0.0),
        total_albums,
    })
}

//! Database initialization
//!
//! Creates the SQLite database and schema on first run, opens it on
//! subsequent runs. All DDL is idempotent (`CREATE TABLE IF NOT EXISTS`).

use crate::auth;
use crate::policy::Role;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Username and initial password of the seeded administrator account
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Pragmas are per-connection in SQLite, so they are set through the
    // connect options rather than one-off queries against the pool.
    // Cascade deletes depend on foreign_keys being on for every connection;
    // WAL allows concurrent readers with one writer.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_users_table(&pool).await?;
    create_sessions_table(&pool).await?;
    create_songs_table(&pool).await?;
    create_ratings_table(&pool).await?;
    create_playlists_table(&pool).await?;
    create_albums_table(&pool).await?;

    seed_admin_account(&pool).await?;

    Ok(pool)
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'listener',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    // filename is UNIQUE: stored files are keyed by it, so two rows
    // sharing a name would share one file on disk
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            singer TEXT,
            artist TEXT NOT NULL,
            genre TEXT NOT NULL,
            lyrics TEXT,
            release_date TEXT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            rating REAL NOT NULL DEFAULT 0.0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_ratings_table(pool: &SqlitePool) -> Result<()> {
    // UNIQUE(user_id, song_id) enforces at most one rating per pair
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            rating INTEGER NOT NULL,
            UNIQUE(user_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_playlists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlist_songs (
            playlist_id INTEGER NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
            song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            UNIQUE(playlist_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS album_songs (
            album_id INTEGER NOT NULL REFERENCES albums(id) ON DELETE CASCADE,
            song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            UNIQUE(album_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Create the default administrator account if none exists
async fn seed_admin_account(pool: &SqlitePool) -> Result<()> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM users WHERE username = ? AND role = 'admin'")
            .bind(DEFAULT_ADMIN_USERNAME)
            .fetch_optional(pool)
            .await?;

    if existing.is_none() {
        let hash = auth::generate_password_hash(DEFAULT_ADMIN_PASSWORD);
        crate::db::users::create_user(pool, DEFAULT_ADMIN_USERNAME, &hash, Role::Admin).await?;
        info!("Seeded default admin account");
    }

    Ok(())
}

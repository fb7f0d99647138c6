//! HTTP API for tunehub-web
//!
//! One module per feature area; each exposes a `*_routes()` builder that
//! is merged into the service router here.

pub mod admin;
pub mod albums;
pub mod auth;
pub mod health;
pub mod home;
pub mod playlists;
pub mod ratings;
pub mod session;
pub mod songs;

use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Directory uploaded audio files are written to
    pub upload_dir: PathBuf,
}

/// Build the service router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::health_routes())
        .merge(auth::auth_routes())
        .merge(home::home_routes())
        .merge(songs::song_routes())
        .merge(ratings::rating_routes())
        .merge(playlists::playlist_routes())
        .merge(albums::album_routes())
        .merge(admin::admin_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

//! # TuneHub Web Service (tunehub-web)
//!
//! HTTP interface of the TuneHub music-sharing service: registration and
//! login, song upload and management, playlists and albums, ratings, and
//! the admin dashboard. All domain logic lives in `tunehub-common`; this
//! crate is the axum routing and request/response layer.

pub mod api;
pub mod error;

pub use api::{build_router, AppState};
pub use error::{ApiError, ApiResult};

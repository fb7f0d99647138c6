//! Rating routes

use crate::api::session::CurrentUser;
use crate::api::AppState;
use crate::error::{ApiError, ApiResult};
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use tunehub_common::db::ratings::{self, RateOutcome};
use tunehub_common::db::songs;

/// Accepted rating value range
const MIN_RATING: i64 = 1;
const MAX_RATING: i64 = 5;

pub fn rating_routes() -> Router<AppState> {
    Router::new().route("/rate/:song_id", post(rate_song))
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    rating: i64,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    status: String,
    message: String,
    /// Stored average after this request (unchanged on a repeat rating)
    average_rating: f64,
}

/// POST /rate/:id - Rate a song once per user
///
/// A repeat rating by the same user is answered with a notice rather
/// than an error.
pub async fn rate_song(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
    current: CurrentUser,
    Json(req): Json<RateRequest>,
) -> ApiResult<Json<RateResponse>> {
    if !(MIN_RATING..=MAX_RATING).contains(&req.rating) {
        return Err(ApiError::BadRequest(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }

    // 404 before touching the ratings table
    let song = songs::get_song(&state.db, song_id).await?;

    match ratings::rate_song(&state.db, song_id, current.user.id, req.rating).await? {
        RateOutcome::Recorded { average } => {
            info!(
                "User {} rated song {} with {}",
                current.user.username, song_id, req.rating
            );
            Ok(Json(RateResponse {
                status: "rated".to_string(),
                message: "Song successfully rated!".to_string(),
                average_rating: average,
            }))
        }
        RateOutcome::AlreadyRated => Ok(Json(RateResponse {
            status: "already_rated".to_string(),
            message: "You have already rated this song!".to_string(),
            average_rating: song.rating,
        })),
    }
}

//! Handlers for per-user movie ratings. All require an authenticated caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cinedex_core::types::DbId;
use cinedex_db::models::rating::MovieRating;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::cancel::RequestCancel;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RateMovieRequest {
    pub rating: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRatingResponse {
    pub movie_id: DbId,
    pub slug: String,
    pub rating: i32,
}

impl From<MovieRating> for MovieRatingResponse {
    fn from(r: MovieRating) -> Self {
        Self {
            movie_id: r.movie_id,
            slug: r.slug,
            rating: r.rating,
        }
    }
}

/// PUT /api/v1/movies/{id}/ratings
///
/// Set the caller's rating (1-5), replacing any previous one.
pub async fn rate_movie(
    user: AuthUser,
    RequestCancel(cancel): RequestCancel,
    State(state): State<AppState>,
    Path(movie_id): Path<DbId>,
    Json(input): Json<RateMovieRequest>,
) -> AppResult<impl IntoResponse> {
    let rated = state
        .catalog
        .rate_movie(movie_id, input.rating, user.user_id, &cancel)
        .await?;

    if !rated {
        return Err(AppError::movie_not_found(movie_id));
    }
    Ok(StatusCode::OK)
}

/// DELETE /api/v1/movies/{id}/ratings
pub async fn delete_rating(
    user: AuthUser,
    RequestCancel(cancel): RequestCancel,
    State(state): State<AppState>,
    Path(movie_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = state
        .catalog
        .delete_rating(movie_id, user.user_id, &cancel)
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!(
            "No rating for movie {movie_id}"
        )));
    }
    Ok(StatusCode::OK)
}

/// GET /api/v1/ratings/me
///
/// Every rating the caller has submitted.
pub async fn my_ratings(
    user: AuthUser,
    RequestCancel(cancel): RequestCancel,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let ratings = state
        .catalog
        .ratings_for_user(user.user_id, &cancel)
        .await?;

    let data: Vec<MovieRatingResponse> = ratings.into_iter().map(Into::into).collect();
    Ok(Json(DataResponse { data }))
}

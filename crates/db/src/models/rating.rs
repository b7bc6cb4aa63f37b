//! Rating row models.

use cinedex_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// One rating submitted by a user, joined to the movie's slug for display.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct MovieRating {
    pub movie_id: DbId,
    pub slug: String,
    pub rating: i32,
}

/// Aggregate rating for a movie plus one user's own value.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromRow)]
pub struct RatingSummary {
    pub rating: Option<f64>,
    pub user_rating: Option<i32>,
}

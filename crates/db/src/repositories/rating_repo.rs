//! Repository for the `ratings` table.
//!
//! Ratings are keyed by `(user_id, movie_id)`. The repository does not
//! check that the movie exists; callers must do that first.

use cinedex_core::types::DbId;
use sqlx::PgPool;

use crate::models::rating::{MovieRating, RatingSummary};

/// Provides per-user rating upserts and rating aggregates.
pub struct RatingRepo;

impl RatingRepo {
    /// Insert or replace a user's rating for a movie.
    ///
    /// Uses `ON CONFLICT` so concurrent rates by the same user never race
    /// on a read-then-write. Returns `true` if a row was inserted or updated.
    pub async fn rate_movie(
        pool: &PgPool,
        movie_id: DbId,
        user_id: DbId,
        rating: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO ratings (user_id, movie_id, rating) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, movie_id) DO UPDATE SET rating = EXCLUDED.rating",
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(rating)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a user's rating. Returns `true` if a row was removed.
    pub async fn delete_rating(
        pool: &PgPool,
        movie_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ratings WHERE movie_id = $1 AND user_id = $2")
            .bind(movie_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Average rating across all users, rounded to one decimal.
    ///
    /// Returns `None` when the movie has no ratings.
    pub async fn get_rating(pool: &PgPool, movie_id: DbId) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<f64>>(
            "SELECT ROUND(AVG(rating), 1)::float8 FROM ratings WHERE movie_id = $1",
        )
        .bind(movie_id)
        .fetch_one(pool)
        .await
    }

    /// Average rating plus the given user's own rating.
    pub async fn get_rating_for_user(
        pool: &PgPool,
        movie_id: DbId,
        user_id: DbId,
    ) -> Result<RatingSummary, sqlx::Error> {
        sqlx::query_as::<_, RatingSummary>(
            "SELECT ROUND(AVG(rating), 1)::float8 AS rating, \
                    MAX(rating) FILTER (WHERE user_id = $2) AS user_rating \
             FROM ratings WHERE movie_id = $1",
        )
        .bind(movie_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// All ratings a user has submitted, ordered by movie slug.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<MovieRating>, sqlx::Error> {
        sqlx::query_as::<_, MovieRating>(
            "SELECT r.movie_id, m.slug, r.rating \
             FROM ratings r \
             JOIN movies m ON m.id = r.movie_id \
             WHERE r.user_id = $1 \
             ORDER BY m.slug",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}

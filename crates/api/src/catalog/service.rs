//! Catalog service.
//!
//! Held in [`AppState`](crate::state::AppState) as an `Arc<CatalogService>`.
//! Every public method takes a [`CancellationToken`]; each store call is
//! raced against it, and on cancellation the store future is dropped, which
//! aborts the query and rolls back any open transaction.

use std::future::Future;

use cinedex_core::error::CoreError;
use cinedex_core::listing::MovieListOptions;
use cinedex_core::movie::Movie;
use cinedex_core::rating::validate_rating;
use cinedex_core::types::DbId;
use cinedex_db::models::rating::{MovieRating, RatingSummary};
use cinedex_db::repositories::{MovieRepo, RatingRepo};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};

/// Orchestrates validation, existence checks, and the movie/rating stores.
///
/// Order of operations per write:
/// 1. Validate input (no storage access on failure).
/// 2. Confirm the target movie exists where the operation needs one.
/// 3. Perform the write.
/// 4. For updates, refresh the rating fields on the returned movie.
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // -----------------------------------------------------------------------
    // Movies
    // -----------------------------------------------------------------------

    /// Validate and insert a movie. Returns whether the row was inserted.
    pub async fn create(&self, movie: &Movie, cancel: &CancellationToken) -> AppResult<bool> {
        movie.validate_movie()?;

        let created = run(cancel, "create_movie", MovieRepo::create(&self.pool, movie)).await?;

        tracing::info!(movie_id = %movie.id, slug = %movie.slug, "Movie created");
        Ok(created)
    }

    pub async fn get_by_id(
        &self,
        id: DbId,
        user_id: Option<DbId>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        tracing::debug!(movie_id = %id, "Fetching movie by id");
        run(cancel, "get_movie", MovieRepo::find_by_id(&self.pool, id, user_id)).await
    }

    pub async fn get_by_slug(
        &self,
        slug: &str,
        user_id: Option<DbId>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        tracing::debug!(slug, "Fetching movie by slug");
        run(
            cancel,
            "get_movie_by_slug",
            MovieRepo::find_by_slug(&self.pool, slug, user_id),
        )
        .await
    }

    /// Validate listing options and return one page of movies.
    pub async fn list(
        &self,
        options: &MovieListOptions,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Movie>> {
        options.validate_options()?;

        tracing::debug!(
            page = options.page,
            page_size = options.page_size,
            "Listing movies"
        );
        run(cancel, "list_movies", MovieRepo::list(&self.pool, options)).await
    }

    /// Count movies under the same filter [`CatalogService::list`] uses.
    pub async fn count(
        &self,
        title: Option<&str>,
        year_of_release: Option<i32>,
        cancel: &CancellationToken,
    ) -> AppResult<i64> {
        run(
            cancel,
            "count_movies",
            MovieRepo::count(&self.pool, title, year_of_release),
        )
        .await
    }

    /// Validate and update a movie.
    ///
    /// Returns `None` if the movie does not exist. On success the returned
    /// movie is the caller's input with freshly read rating fields; title,
    /// year and genres are not re-read, so a concurrent writer's changes to
    /// those are not reflected.
    pub async fn update(
        &self,
        mut movie: Movie,
        user_id: Option<DbId>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        movie.validate_movie()?;

        if !run(cancel, "movie_exists", MovieRepo::exists(&self.pool, movie.id)).await? {
            return Ok(None);
        }

        // The row can still vanish between the check and the write.
        if !run(cancel, "update_movie", MovieRepo::update(&self.pool, &movie)).await? {
            return Ok(None);
        }

        let summary = match user_id {
            Some(user_id) => {
                run(
                    cancel,
                    "get_rating_for_user",
                    RatingRepo::get_rating_for_user(&self.pool, movie.id, user_id),
                )
                .await?
            }
            None => RatingSummary {
                rating: run(
                    cancel,
                    "get_rating",
                    RatingRepo::get_rating(&self.pool, movie.id),
                )
                .await?,
                user_rating: None,
            },
        };
        movie.rating = summary.rating;
        movie.user_rating = summary.user_rating;

        tracing::info!(movie_id = %movie.id, slug = %movie.slug, "Movie updated");
        Ok(Some(movie))
    }

    /// Delete a movie. Returns `false` if it did not exist.
    pub async fn delete(&self, id: DbId, cancel: &CancellationToken) -> AppResult<bool> {
        let deleted = run(cancel, "delete_movie", MovieRepo::delete(&self.pool, id)).await?;
        if deleted {
            tracing::info!(movie_id = %id, "Movie deleted");
        }
        Ok(deleted)
    }

    // -----------------------------------------------------------------------
    // Ratings
    // -----------------------------------------------------------------------

    /// Record a user's rating for a movie.
    ///
    /// The range check runs before any storage access. Returns `false` if
    /// the movie does not exist.
    pub async fn rate_movie(
        &self,
        movie_id: DbId,
        rating: i32,
        user_id: DbId,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        validate_rating(rating)?;

        if !run(cancel, "movie_exists", MovieRepo::exists(&self.pool, movie_id)).await? {
            return Ok(false);
        }

        let rated = run(
            cancel,
            "rate_movie",
            RatingRepo::rate_movie(&self.pool, movie_id, user_id, rating),
        )
        .await?;

        tracing::info!(movie_id = %movie_id, user_id = %user_id, rating, "Movie rated");
        Ok(rated)
    }

    /// Remove a user's rating. Returns `false` if there was none.
    pub async fn delete_rating(
        &self,
        movie_id: DbId,
        user_id: DbId,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        let deleted = run(
            cancel,
            "delete_rating",
            RatingRepo::delete_rating(&self.pool, movie_id, user_id),
        )
        .await?;
        if deleted {
            tracing::info!(movie_id = %movie_id, user_id = %user_id, "Rating deleted");
        }
        Ok(deleted)
    }

    pub async fn ratings_for_user(
        &self,
        user_id: DbId,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<MovieRating>> {
        tracing::debug!(user_id = %user_id, "Listing ratings for user");
        run(
            cancel,
            "ratings_for_user",
            RatingRepo::list_for_user(&self.pool, user_id),
        )
        .await
    }
}

/// Drive a store future unless `cancel` fires first.
///
/// Cancellation is checked before the store future is polled, so an already
/// cancelled token never touches the database.
async fn run<T, F>(cancel: &CancellationToken, operation: &'static str, fut: F) -> AppResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::warn!(operation, "Catalog operation cancelled");
            Err(AppError::Core(CoreError::Cancelled))
        }
        result = fut => result.map_err(AppError::from),
    }
}

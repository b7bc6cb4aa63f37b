//! Repository for the `movies` and `genres` tables.
//!
//! Writes that touch both tables run in one transaction. Reads fold the
//! rating aggregate (and optionally one user's rating) into each movie.

use cinedex_core::listing::{MovieListOptions, MovieSort, SortField, SortOrder};
use cinedex_core::movie::Movie;
use cinedex_core::types::DbId;
use sqlx::PgPool;

use crate::models::movie::MovieRow;

/// Scalar columns plus the rating aggregate for a single-movie lookup.
///
/// `$2` is the optional requesting user; comparing against NULL matches no
/// row, which leaves `user_rating` NULL for anonymous callers.
const SINGLE_SELECT: &str = "\
    SELECT m.id, m.slug, m.title, m.year_of_release, \
           ROUND(AVG(r.rating), 1)::float8 AS rating, \
           MAX(r.rating) FILTER (WHERE r.user_id = $2) AS user_rating \
    FROM movies m \
    LEFT JOIN ratings r ON r.movie_id = m.id";

/// Filter shared by [`MovieRepo::list`] and [`MovieRepo::count`].
///
/// `$1` is an escaped title pattern, `$2` an exact year; either may be NULL.
const LIST_FILTER: &str = "\
    WHERE ($1::text IS NULL OR m.title ILIKE ('%' || $1 || '%')) \
      AND ($2::int IS NULL OR m.year_of_release = $2)";

/// Provides CRUD, listing, and existence checks for movies.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a movie and, if the row went in, its genres.
    ///
    /// Returns `true` if the movie row was inserted. A slug collision fails
    /// with a unique violation on `uq_movies_slug` and nothing is written.
    pub async fn create(pool: &PgPool, movie: &Movie) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO movies (id, slug, title, year_of_release) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(movie.id)
        .bind(&movie.slug)
        .bind(&movie.title)
        .bind(movie.year_of_release)
        .execute(&mut *tx)
        .await?;

        let inserted = result.rows_affected() == 1;
        if inserted {
            Self::insert_genres(&mut tx, movie.id, movie.genres.iter()).await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Find a movie by id, with ratings and genres.
    ///
    /// Genres come from a second query rather than a join so the rating
    /// aggregate is computed over one row per rating.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: Option<DbId>,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("{SINGLE_SELECT} WHERE m.id = $1 GROUP BY m.id");
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Self::hydrate_genres(pool, row).await
    }

    /// Find a movie by slug, with ratings and genres.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
        user_id: Option<DbId>,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("{SINGLE_SELECT} WHERE m.slug = $1 GROUP BY m.id");
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(slug)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Self::hydrate_genres(pool, row).await
    }

    /// List one page of movies matching `options`.
    ///
    /// Genres and ratings are aggregated in lateral subqueries so each movie
    /// appears once and the average is not skewed by the genre count. With
    /// no sort field there is no `ORDER BY`, so row order is whatever the
    /// database returns.
    pub async fn list(
        pool: &PgPool,
        options: &MovieListOptions,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        let order_by = order_by_clause(options.sort);
        let query = format!(
            "SELECT m.id, m.slug, m.title, m.year_of_release, \
                    COALESCE(g.genres, ARRAY[]::text[]) AS genres, \
                    r.rating, \
                    ur.rating AS user_rating \
             FROM movies m \
             LEFT JOIN LATERAL ( \
                 SELECT array_agg(name ORDER BY name) AS genres \
                 FROM genres WHERE movie_id = m.id \
             ) g ON TRUE \
             LEFT JOIN LATERAL ( \
                 SELECT ROUND(AVG(rating), 1)::float8 AS rating \
                 FROM ratings WHERE movie_id = m.id \
             ) r ON TRUE \
             LEFT JOIN ratings ur ON ur.movie_id = m.id AND ur.user_id = $3 \
             {LIST_FILTER} \
             {order_by} \
             LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, MovieRow>(&query)
            .bind(options.title.as_deref().map(escape_like))
            .bind(options.year_of_release)
            .bind(options.user_id)
            .bind(options.page_size)
            .bind(options.offset())
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    /// Count movies matching the same filter [`MovieRepo::list`] applies.
    pub async fn count(
        pool: &PgPool,
        title: Option<&str>,
        year_of_release: Option<i32>,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM movies m {LIST_FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(title.map(escape_like))
            .bind(year_of_release)
            .fetch_one(pool)
            .await
    }

    /// Replace a movie's scalar fields and genre set.
    ///
    /// Genres are deleted and re-inserted, not diffed. Returns `false` (and
    /// writes nothing) if no movie with this id exists. Last writer wins:
    /// there is no version check.
    pub async fn update(pool: &PgPool, movie: &Movie) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE movies SET slug = $2, title = $3, year_of_release = $4 \
             WHERE id = $1",
        )
        .bind(movie.id)
        .bind(&movie.slug)
        .bind(&movie.title)
        .bind(movie.year_of_release)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM genres WHERE movie_id = $1")
            .bind(movie.id)
            .execute(&mut *tx)
            .await?;
        Self::insert_genres(&mut tx, movie.id, movie.genres.iter()).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a movie and its genres. Returns `true` if the movie row was removed.
    ///
    /// Ratings go with the movie through `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM genres WHERE movie_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a movie with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn insert_genres<'a>(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        movie_id: DbId,
        genres: impl Iterator<Item = &'a String>,
    ) -> Result<(), sqlx::Error> {
        for genre in genres {
            sqlx::query("INSERT INTO genres (movie_id, name) VALUES ($1, $2)")
                .bind(movie_id)
                .bind(genre)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn hydrate_genres(
        pool: &PgPool,
        row: Option<MovieRow>,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let Some(mut row) = row else {
            return Ok(None);
        };
        row.genres = sqlx::query_scalar::<_, String>(
            "SELECT name FROM genres WHERE movie_id = $1 ORDER BY name",
        )
        .bind(row.id)
        .fetch_all(pool)
        .await?;
        Ok(Some(row.into()))
    }
}

/// Map a sort choice to a fixed `ORDER BY` fragment.
///
/// `m.id` breaks ties so page boundaries do not shift between requests.
fn order_by_clause(sort: Option<MovieSort>) -> &'static str {
    let Some(sort) = sort else {
        return "";
    };
    match (sort.field, sort.order) {
        (SortField::Title, SortOrder::Ascending) => "ORDER BY m.title ASC, m.id ASC",
        (SortField::Title, SortOrder::Descending) => "ORDER BY m.title DESC, m.id ASC",
        (SortField::YearOfRelease, SortOrder::Ascending) => {
            "ORDER BY m.year_of_release ASC, m.id ASC"
        }
        (SortField::YearOfRelease, SortOrder::Descending) => {
            "ORDER BY m.year_of_release DESC, m.id ASC"
        }
    }
}

/// Escape `LIKE` metacharacters so the title filter is a literal substring.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

//! Movie row model.

use cinedex_core::movie::Movie;
use cinedex_core::types::DbId;
use sqlx::FromRow;

/// A movie row joined with its rating aggregate.
///
/// `genres` is filled either by the listing query (as a `text[]` column)
/// or by a follow-up query for single-movie lookups, where the column is
/// absent from the projection.
#[derive(Debug, Clone, FromRow)]
pub struct MovieRow {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub year_of_release: i32,
    #[sqlx(default)]
    pub genres: Vec<String>,
    /// Average of all ratings rounded to one decimal; `None` when unrated.
    pub rating: Option<f64>,
    /// The requesting user's own rating, if any.
    pub user_rating: Option<i32>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            year_of_release: row.year_of_release,
            slug: row.slug,
            genres: row.genres.into_iter().collect(),
            rating: row.rating,
            user_rating: row.user_rating,
        }
    }
}

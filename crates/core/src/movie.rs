//! Movie domain type, slug derivation, and movie validation rules.

use std::collections::BTreeSet;

use chrono::Datelike;
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;
use crate::validation::{ensure_valid, from_validator, FieldViolation};

/// Maximum genre label length in characters.
pub const MAX_GENRE_LEN: usize = 64;

/// A movie as seen by the catalog.
///
/// `rating` and `user_rating` are derived on read and never written by the
/// movie store. `user_rating` is only populated when a requesting user is
/// known.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Movie {
    pub id: DbId,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,
    pub year_of_release: i32,
    pub slug: String,
    pub genres: BTreeSet<String>,
    pub rating: Option<f64>,
    pub user_rating: Option<i32>,
}

impl Movie {
    /// Build a movie, deriving its slug from title and year.
    pub fn new(
        id: DbId,
        title: impl Into<String>,
        year_of_release: i32,
        genres: impl IntoIterator<Item = String>,
    ) -> Self {
        let title = title.into();
        let slug = generate_slug(&title, year_of_release);
        Self {
            id,
            title,
            year_of_release,
            slug,
            genres: genres.into_iter().collect(),
            rating: None,
            user_rating: None,
        }
    }

    /// Check every movie rule and collect all failures.
    pub fn validate_movie(&self) -> Result<(), CoreError> {
        let mut violations = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => from_validator(&errors),
        };

        if !self.title.is_empty() {
            if self.title.trim().is_empty() {
                violations.push(FieldViolation::new("title", "Title must not be blank"));
            } else if !self.title.chars().any(|c| c.is_ascii_alphanumeric()) {
                violations.push(FieldViolation::new(
                    "title",
                    "Title must contain at least one letter or digit",
                ));
            }
        }

        if let Some(v) = validate_year(self.year_of_release, "yearOfRelease") {
            violations.push(v);
        }

        for genre in &self.genres {
            if genre.trim().is_empty() {
                violations.push(FieldViolation::new("genres", "Genre must not be blank"));
            } else if genre.chars().count() > MAX_GENRE_LEN {
                violations.push(FieldViolation::new(
                    "genres",
                    format!("Genre '{genre}' exceeds {MAX_GENRE_LEN} characters"),
                ));
            }
        }

        ensure_valid(violations)
    }
}

/// The current UTC calendar year.
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// A release year may not lie in the future.
pub fn validate_year(year: i32, field: &str) -> Option<FieldViolation> {
    let now = current_year();
    (year > now).then(|| {
        FieldViolation::new(field, format!("Year of release must not be later than {now}"))
    })
}

/// Generate a URL-safe slug from a title and release year.
///
/// Lowercases the title, replaces anything that is not an ASCII letter or
/// digit with a hyphen, collapses consecutive hyphens, trims them from both
/// ends, and appends `-{year}`.
pub fn generate_slug(title: &str, year_of_release: i32) -> String {
    let mut result = String::with_capacity(title.len() + 5);
    let mut prev_hyphen = true;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }

    let base = result.trim_end_matches('-');
    if base.is_empty() {
        year_of_release.to_string()
    } else {
        format!("{base}-{year_of_release}")
    }
}

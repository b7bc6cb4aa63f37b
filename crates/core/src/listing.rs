//! Listing options: filtering, sorting, and paging for movie queries.
//!
//! Sorting is a closed set of fields. The repository maps each variant to a
//! fixed SQL fragment, so caller text never reaches the query.

use std::str::FromStr;

use validator::Validate;

use crate::error::CoreError;
use crate::movie::validate_year;
use crate::types::DbId;
use crate::validation::{ensure_valid, from_validator, FieldViolation};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 25;
/// Highest page whose offset still fits in an `i64` at the largest page size.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Fields a listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    YearOfRelease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl FromStr for MovieSort {
    type Err = FieldViolation;

    /// Parse `title`, `yearofrelease`, optionally prefixed with `-` for
    /// descending order. Matching is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (order, name) = match s.strip_prefix('-') {
            Some(rest) => (SortOrder::Descending, rest),
            None => (SortOrder::Ascending, s.strip_prefix('+').unwrap_or(s)),
        };
        let field = if name.eq_ignore_ascii_case("title") {
            SortField::Title
        } else if name.eq_ignore_ascii_case("yearofrelease") {
            SortField::YearOfRelease
        } else {
            return Err(FieldViolation::new(
                "sortBy",
                "You can only sort by 'title' or 'yearofrelease'",
            ));
        };
        Ok(Self { field, order })
    }
}

/// In-memory descriptor for a movie listing query. Never persisted.
///
/// `user_id` only selects whose personal rating is joined into the results;
/// it does not filter them.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct MovieListOptions {
    pub title: Option<String>,
    pub year_of_release: Option<i32>,
    pub sort: Option<MovieSort>,
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: i64,
    #[validate(range(
        min = 1,
        max = 25,
        message = "Page size must be between 1 and 25 movies per page"
    ))]
    pub page_size: i64,
    pub user_id: Option<DbId>,
}

impl Default for MovieListOptions {
    fn default() -> Self {
        Self {
            title: None,
            year_of_release: None,
            sort: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            user_id: None,
        }
    }
}

impl MovieListOptions {
    /// Rows to skip: `(page - 1) * page_size`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.page_size)
    }

    /// Whether rows remain beyond this page out of `total` matches.
    pub fn has_next_page(&self, total: i64) -> bool {
        total > self.page.saturating_mul(self.page_size)
    }

    /// All listing rule violations; empty when the options are valid.
    pub fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => from_validator(&errors),
        };
        if self.page > MAX_PAGE {
            violations.push(FieldViolation::new(
                "page",
                format!("Page must be at most {MAX_PAGE}"),
            ));
        }
        if let Some(v) = self.year_of_release.and_then(|y| validate_year(y, "year")) {
            violations.push(v);
        }
        violations
    }

    pub fn validate_options(&self) -> Result<(), CoreError> {
        ensure_valid(self.violations())
    }
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    total / page_size + i64::from(total % page_size != 0)
}

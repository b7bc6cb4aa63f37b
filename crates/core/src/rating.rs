//! Rating bounds.

use crate::error::CoreError;
use crate::validation::FieldViolation;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Reject a rating outside `[MIN_RATING, MAX_RATING]`.
pub fn validate_rating(value: i32) -> Result<(), CoreError> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(vec![FieldViolation::new(
            "rating",
            format!("Rating must be between {MIN_RATING} and {MAX_RATING}"),
        )]))
    }
}

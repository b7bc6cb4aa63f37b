//! Route definitions for the caller's own ratings, mounted at `/ratings`.

use axum::routing::get;
use axum::Router;

use crate::handlers::ratings;
use crate::state::AppState;

/// ```text
/// GET    /me                -> my_ratings
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(ratings::my_ratings))
}

pub mod health;
pub mod movies;
pub mod ratings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /movies                        list, create
/// /movies/{idOrSlug}             get
/// /movies/{id}                   update, delete
/// /movies/{id}/ratings           rate, delete rating
///
/// /ratings/me                    the caller's ratings
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/movies", movies::router())
        .nest("/ratings", ratings::router())
}

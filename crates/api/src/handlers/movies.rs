//! Handlers for the movie catalog.
//!
//! Reads accept anonymous callers (an authenticated caller additionally
//! sees their own rating). Creating and updating require a trusted member,
//! deleting requires an admin. Every successful write evicts the `movies`
//! output-cache tag.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use cinedex_core::error::CoreError;
use cinedex_core::listing::{
    total_pages, MovieListOptions, MovieSort, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
use cinedex_core::movie::Movie;
use cinedex_core::types::DbId;
use cinedex_core::validation::ensure_valid;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::MOVIES_CACHE_TAG;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::cancel::RequestCancel;
use crate::middleware::rbac::{RequireAdmin, RequireTrustedMember};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    pub title: String,
    pub year_of_release: i32,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl CreateMovieRequest {
    fn into_movie(self, id: DbId) -> Movie {
        Movie::new(id, self.title, self.year_of_release, self.genres)
    }
}

/// Full replacement of a movie's editable fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieRequest {
    pub title: String,
    pub year_of_release: i32,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl UpdateMovieRequest {
    fn into_movie(self, id: DbId) -> Movie {
        Movie::new(id, self.title, self.year_of_release, self.genres)
    }
}

/// Query string for `GET /movies`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieListQuery {
    pub title: Option<String>,
    pub year: Option<i32>,
    /// `title` or `yearofrelease`, prefixed with `-` for descending.
    pub sort_by: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl MovieListQuery {
    /// Build listing options, reporting every invalid parameter at once.
    pub fn into_options(self, user_id: Option<DbId>) -> Result<MovieListOptions, CoreError> {
        let (sort, sort_violation) = match self.sort_by.as_deref() {
            None | Some("") => (None, None),
            Some(raw) => match raw.parse::<MovieSort>() {
                Ok(sort) => (Some(sort), None),
                Err(violation) => (None, Some(violation)),
            },
        };

        let options = MovieListOptions {
            title: self.title,
            year_of_release: self.year,
            sort,
            page: self.page.unwrap_or(DEFAULT_PAGE),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            user_id,
        };

        let mut violations = options.violations();
        violations.extend(sort_violation);
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        ensure_valid(violations)?;
        Ok(options)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub rating: Option<f64>,
    pub user_rating: Option<i32>,
    pub year_of_release: i32,
    pub genres: Vec<String>,
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            slug: movie.slug,
            rating: movie.rating,
            user_rating: movie.user_rating,
            year_of_release: movie.year_of_release,
            genres: movie.genres.into_iter().collect(),
        }
    }
}

/// One page of movies plus the paging totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviesResponse {
    pub items: Vec<MovieResponse>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
}

impl MoviesResponse {
    pub fn new(movies: Vec<Movie>, options: &MovieListOptions, total: i64) -> Self {
        Self {
            items: movies.into_iter().map(MovieResponse::from).collect(),
            page: options.page,
            page_size: options.page_size,
            total,
            total_pages: total_pages(total, options.page_size),
            has_next_page: options.has_next_page(total),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/movies
///
/// Create a movie. Responds 201 with a `Location` header; 409 if another
/// movie already has the same slug.
pub async fn create_movie(
    RequireTrustedMember(user): RequireTrustedMember,
    RequestCancel(cancel): RequestCancel,
    State(state): State<AppState>,
    Json(input): Json<CreateMovieRequest>,
) -> AppResult<impl IntoResponse> {
    let movie = input.into_movie(Uuid::now_v7());

    if !state.catalog.create(&movie, &cancel).await? {
        return Err(AppError::InternalError(format!(
            "Movie {} was not inserted",
            movie.id
        )));
    }
    state.output_cache.evict_by_tag(MOVIES_CACHE_TAG).await;

    tracing::info!(movie_id = %movie.id, user_id = %user.user_id, "Movie created via API");

    let location = format!("/api/v1/movies/{}", movie.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(MovieResponse::from(movie)),
    ))
}

/// GET /api/v1/movies/{idOrSlug}
///
/// A value that parses as a UUID is looked up by id, anything else by slug.
pub async fn get_movie(
    auth: MaybeAuthUser,
    RequestCancel(cancel): RequestCancel,
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user_id = auth.user_id();

    let movie = match id_or_slug.parse::<DbId>() {
        Ok(id) => state
            .catalog
            .get_by_id(id, user_id, &cancel)
            .await?
            .ok_or_else(|| AppError::movie_not_found(id))?,
        Err(_) => state
            .catalog
            .get_by_slug(&id_or_slug, user_id, &cancel)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movie '{id_or_slug}' not found")))?,
    };

    Ok(Json(MovieResponse::from(movie)))
}

/// GET /api/v1/movies
///
/// Filtered, sorted, paged listing.
pub async fn list_movies(
    auth: MaybeAuthUser,
    RequestCancel(cancel): RequestCancel,
    State(state): State<AppState>,
    Query(query): Query<MovieListQuery>,
) -> AppResult<impl IntoResponse> {
    let options = query.into_options(auth.user_id())?;

    let movies = state.catalog.list(&options, &cancel).await?;
    let total = state
        .catalog
        .count(options.title.as_deref(), options.year_of_release, &cancel)
        .await?;

    Ok(Json(MoviesResponse::new(movies, &options, total)))
}

/// PUT /api/v1/movies/{id}
///
/// Replace title, year and genres. The slug is re-derived.
pub async fn update_movie(
    RequireTrustedMember(user): RequireTrustedMember,
    RequestCancel(cancel): RequestCancel,
    State(state): State<AppState>,
    Path(movie_id): Path<DbId>,
    Json(input): Json<UpdateMovieRequest>,
) -> AppResult<impl IntoResponse> {
    let movie = input.into_movie(movie_id);

    let updated = state
        .catalog
        .update(movie, Some(user.user_id), &cancel)
        .await?
        .ok_or_else(|| AppError::movie_not_found(movie_id))?;
    state.output_cache.evict_by_tag(MOVIES_CACHE_TAG).await;

    Ok(Json(MovieResponse::from(updated)))
}

/// DELETE /api/v1/movies/{id}
///
/// Admin only. Ratings and genres go with the movie.
pub async fn delete_movie(
    RequireAdmin(admin): RequireAdmin,
    RequestCancel(cancel): RequestCancel,
    State(state): State<AppState>,
    Path(movie_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !state.catalog.delete(movie_id, &cancel).await? {
        return Err(AppError::movie_not_found(movie_id));
    }
    state.output_cache.evict_by_tag(MOVIES_CACHE_TAG).await;

    tracing::info!(movie_id = %movie_id, user_id = %admin.user_id, "Movie deleted via API");

    Ok(StatusCode::OK)
}

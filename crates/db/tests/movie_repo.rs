//! Integration tests for the movie store.
//!
//! Exercises `MovieRepo` against a real database:
//! - Create / find round trips by id and slug
//! - Slug uniqueness and transactional rollback
//! - Update (genre replacement, slug rewrite, missing rows)
//! - Delete semantics
//! - Listing: filters, sorting, paging, and rating aggregation

use assert_matches::assert_matches;
use cinedex_core::listing::{MovieListOptions, MovieSort, SortField, SortOrder};
use cinedex_core::movie::Movie;
use cinedex_db::repositories::{MovieRepo, RatingRepo};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_movie(title: &str, year: i32, genres: &[&str]) -> Movie {
    Movie::new(
        Uuid::new_v4(),
        title,
        year,
        genres.iter().map(|g| g.to_string()),
    )
}

async fn seed(pool: &PgPool, movie: &Movie) {
    assert!(MovieRepo::create(pool, movie).await.unwrap());
}

/// Ten movies titled "Movie 00" .. "Movie 09", released 2000..2009.
async fn seed_ten(pool: &PgPool) -> Vec<Movie> {
    let mut movies = Vec::new();
    for i in 0..10 {
        let movie = new_movie(&format!("Movie {i:02}"), 2000 + i, &["Drama"]);
        seed(pool, &movie).await;
        movies.push(movie);
    }
    movies
}

fn sorted(field: SortField, order: SortOrder) -> Option<MovieSort> {
    Some(MovieSort { field, order })
}

// ---------------------------------------------------------------------------
// Create / find
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_then_find_by_id_returns_same_movie(pool: PgPool) {
    let movie = new_movie("Blade Runner", 1982, &["Sci-Fi", "Noir", "Thriller"]);
    seed(&pool, &movie).await;

    let found = MovieRepo::find_by_id(&pool, movie.id, None)
        .await
        .unwrap()
        .expect("movie should exist");

    assert_eq!(found.id, movie.id);
    assert_eq!(found.title, "Blade Runner");
    assert_eq!(found.year_of_release, 1982);
    assert_eq!(found.slug, "blade-runner-1982");
    assert_eq!(found.genres, movie.genres);
    assert_eq!(found.rating, None);
    assert_eq!(found.user_rating, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_by_slug_matches_find_by_id(pool: PgPool) {
    let movie = new_movie("Alien", 1979, &["Horror", "Sci-Fi"]);
    seed(&pool, &movie).await;

    let by_id = MovieRepo::find_by_id(&pool, movie.id, None).await.unwrap();
    let by_slug = MovieRepo::find_by_slug(&pool, "alien-1979", None)
        .await
        .unwrap();

    assert!(by_id.is_some());
    assert_eq!(by_id, by_slug);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_movie_is_none_not_error(pool: PgPool) {
    assert!(MovieRepo::find_by_id(&pool, Uuid::new_v4(), None)
        .await
        .unwrap()
        .is_none());
    assert!(MovieRepo::find_by_slug(&pool, "nope-2000", None)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn genre_labels_may_contain_commas(pool: PgPool) {
    let movie = new_movie("Odd Genres", 2001, &["Action, Adventure", "Drama"]);
    seed(&pool, &movie).await;

    let listed = MovieRepo::list(&pool, &MovieListOptions::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].genres.contains("Action, Adventure"));
    assert_eq!(listed[0].genres.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_slug_fails_and_leaves_first_movie_intact(pool: PgPool) {
    let first = new_movie("Heat", 1995, &["Crime"]);
    seed(&pool, &first).await;

    let second = new_movie("HEAT!", 1995, &["Action", "Drama"]);
    assert_eq!(first.slug, second.slug);

    let err = MovieRepo::create(&pool, &second).await.unwrap_err();
    assert_matches!(
        &err,
        sqlx::Error::Database(db) if db.constraint() == Some("uq_movies_slug")
    );

    // Nothing from the failed insert is visible.
    assert!(!MovieRepo::exists(&pool, second.id).await.unwrap());
    let genre_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres WHERE movie_id = $1")
        .bind(second.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(genre_rows, 0);

    let kept = MovieRepo::find_by_id(&pool, first.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.title, "Heat");
    assert_eq!(kept.genres, first.genres);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_replaces_fields_genres_and_slug(pool: PgPool) {
    let movie = new_movie("Nightcrawler", 2014, &["Crime", "Drama", "Thriller"]);
    seed(&pool, &movie).await;

    let changed = Movie::new(movie.id, "Nightcrawler Redux", 2015, ["Thriller".to_string()]);
    assert!(MovieRepo::update(&pool, &changed).await.unwrap());

    let found = MovieRepo::find_by_id(&pool, movie.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.title, "Nightcrawler Redux");
    assert_eq!(found.year_of_release, 2015);
    assert_eq!(found.slug, "nightcrawler-redux-2015");
    assert_eq!(found.genres.len(), 1);
    assert!(found.genres.contains("Thriller"));
    assert!(MovieRepo::find_by_slug(&pool, "nightcrawler-2014", None)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_missing_movie_returns_false_and_writes_nothing(pool: PgPool) {
    let ghost = new_movie("Ghost", 1990, &["Romance"]);

    assert!(!MovieRepo::update(&pool, &ghost).await.unwrap());

    assert!(!MovieRepo::exists(&pool, ghost.id).await.unwrap());
    let genre_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(genre_rows, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_into_taken_slug_rolls_back(pool: PgPool) {
    let a = new_movie("Up", 2009, &["Animation"]);
    let b = new_movie("Down", 2009, &["Comedy"]);
    seed(&pool, &a).await;
    seed(&pool, &b).await;

    let clash = Movie::new(b.id, "Up", 2009, ["Family".to_string()]);
    assert!(MovieRepo::update(&pool, &clash).await.is_err());

    let kept = MovieRepo::find_by_id(&pool, b.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.title, "Down");
    assert!(kept.genres.contains("Comedy"));
    assert!(!kept.genres.contains("Family"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_updates_are_last_writer_wins(pool: PgPool) {
    let movie = new_movie("Rashomon", 1950, &["Drama"]);
    seed(&pool, &movie).await;

    let first = Movie::new(movie.id, "Rashomon", 1950, ["Mystery".to_string()]);
    let second = Movie::new(movie.id, "Rashomon", 1950, ["Crime".to_string()]);
    assert!(MovieRepo::update(&pool, &first).await.unwrap());
    assert!(MovieRepo::update(&pool, &second).await.unwrap());

    // No version check: the later write silently replaces the earlier one.
    let found = MovieRepo::find_by_id(&pool, movie.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.genres, second.genres);
}

// ---------------------------------------------------------------------------
// Delete / exists
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_twice_returns_false_the_second_time(pool: PgPool) {
    let movie = new_movie("Memento", 2000, &["Mystery"]);
    seed(&pool, &movie).await;

    assert!(MovieRepo::delete(&pool, movie.id).await.unwrap());
    assert!(!MovieRepo::delete(&pool, movie.id).await.unwrap());
    assert!(!MovieRepo::exists(&pool, movie.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_genres_and_ratings(pool: PgPool) {
    let movie = new_movie("Se7en", 1995, &["Crime", "Mystery"]);
    seed(&pool, &movie).await;
    RatingRepo::rate_movie(&pool, movie.id, Uuid::new_v4(), 5)
        .await
        .unwrap();

    assert!(MovieRepo::delete(&pool, movie.id).await.unwrap());

    let leftovers: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM genres) + (SELECT COUNT(*) FROM ratings)",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(leftovers, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_missing_movie_returns_false(pool: PgPool) {
    assert!(!MovieRepo::delete(&pool, Uuid::new_v4()).await.unwrap());
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_page_of_three_returns_ranks_four_to_six(pool: PgPool) {
    seed_ten(&pool).await;

    let options = MovieListOptions {
        sort: sorted(SortField::Title, SortOrder::Ascending),
        page: 2,
        page_size: 3,
        ..Default::default()
    };
    let page = MovieRepo::list(&pool, &options).await.unwrap();
    let titles: Vec<&str> = page.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["Movie 03", "Movie 04", "Movie 05"]);

    let total = MovieRepo::count(&pool, None, None).await.unwrap();
    assert_eq!(total, 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn last_partial_page_and_past_the_end(pool: PgPool) {
    seed_ten(&pool).await;

    let last = MovieListOptions {
        sort: sorted(SortField::Title, SortOrder::Ascending),
        page: 4,
        page_size: 3,
        ..Default::default()
    };
    assert_eq!(MovieRepo::list(&pool, &last).await.unwrap().len(), 1);

    let beyond = MovieListOptions { page: 5, ..last };
    assert!(MovieRepo::list(&pool, &beyond).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sort_by_year_descending_is_non_increasing(pool: PgPool) {
    seed_ten(&pool).await;
    seed(&pool, &new_movie("Another 2005", 2005, &[])).await;

    let options = MovieListOptions {
        sort: sorted(SortField::YearOfRelease, SortOrder::Descending),
        page_size: 25,
        ..Default::default()
    };
    let movies = MovieRepo::list(&pool, &options).await.unwrap();
    assert_eq!(movies.len(), 11);
    assert!(movies
        .windows(2)
        .all(|w| w[0].year_of_release >= w[1].year_of_release));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn title_filter_is_case_insensitive_and_matches_count(pool: PgPool) {
    seed_ten(&pool).await;
    seed(&pool, &new_movie("The Godfather", 1972, &["Crime"])).await;
    seed(&pool, &new_movie("The Godfather Part II", 1974, &["Crime"])).await;

    let options = MovieListOptions {
        title: Some("GODFATHER".to_string()),
        ..Default::default()
    };
    let movies = MovieRepo::list(&pool, &options).await.unwrap();
    assert_eq!(movies.len(), 2);

    let total = MovieRepo::count(&pool, Some("GODFATHER"), None).await.unwrap();
    assert_eq!(total, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn year_filter_is_exact(pool: PgPool) {
    seed_ten(&pool).await;

    let options = MovieListOptions {
        year_of_release: Some(2004),
        ..Default::default()
    };
    let movies = MovieRepo::list(&pool, &options).await.unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "Movie 04");
    assert_eq!(MovieRepo::count(&pool, None, Some(2004)).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn like_metacharacters_in_title_filter_match_literally(pool: PgPool) {
    seed(&pool, &new_movie("100% Wolf", 2020, &[])).await;
    seed(&pool, &new_movie("Wolf Children", 2012, &[])).await;

    let options = MovieListOptions {
        title: Some("%".to_string()),
        ..Default::default()
    };
    let movies = MovieRepo::list(&pool, &options).await.unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "100% Wolf");
    assert_eq!(MovieRepo::count(&pool, Some("%"), None).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ratings_are_not_multiplied_by_genres(pool: PgPool) {
    let movie = new_movie("Parasite", 2019, &["Comedy", "Drama", "Thriller"]);
    seed(&pool, &movie).await;
    let fan = Uuid::new_v4();
    RatingRepo::rate_movie(&pool, movie.id, fan, 4).await.unwrap();
    RatingRepo::rate_movie(&pool, movie.id, Uuid::new_v4(), 5)
        .await
        .unwrap();

    let options = MovieListOptions {
        user_id: Some(fan),
        ..Default::default()
    };
    let listed = MovieRepo::list(&pool, &options).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].genres.len(), 3);
    assert_eq!(listed[0].rating, Some(4.5));
    assert_eq!(listed[0].user_rating, Some(4));

    let found = MovieRepo::find_by_id(&pool, movie.id, Some(fan))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.rating, Some(4.5));
    assert_eq!(found.user_rating, Some(4));
    assert_eq!(found.genres.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_id_does_not_filter_listing(pool: PgPool) {
    seed_ten(&pool).await;

    let options = MovieListOptions {
        user_id: Some(Uuid::new_v4()),
        page_size: 25,
        ..Default::default()
    };
    let movies = MovieRepo::list(&pool, &options).await.unwrap();
    assert_eq!(movies.len(), 10);
    assert!(movies.iter().all(|m| m.user_rating.is_none()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn anonymous_lookup_has_no_user_rating(pool: PgPool) {
    let movie = new_movie("Arrival", 2016, &["Sci-Fi"]);
    seed(&pool, &movie).await;
    RatingRepo::rate_movie(&pool, movie.id, Uuid::new_v4(), 3)
        .await
        .unwrap();

    let found = MovieRepo::find_by_slug(&pool, &movie.slug, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.rating, Some(3.0));
    assert_eq!(found.user_rating, None);
}

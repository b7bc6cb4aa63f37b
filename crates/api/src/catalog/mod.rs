//! Catalog orchestration.
//!
//! [`CatalogService`] sits between the HTTP handlers and the movie/rating
//! repositories. It enforces the ordering rules (validate first, check
//! existence before writing) and makes every store call cancellable.

pub mod service;

pub use service::CatalogService;

//! Domain logic for the movie catalog.
//!
//! This crate has no database or HTTP dependencies so it can be shared by
//! the repository layer, the API server, and their tests.

pub mod error;
pub mod listing;
pub mod movie;
pub mod rating;
pub mod types;
pub mod validation;

//! Row types returned by the repositories.
//!
//! Each submodule contains `FromRow` structs matching query projections.
//! Conversion into domain types from `cinedex_core` happens here so the
//! repositories hand back ready-to-use values.

pub mod movie;
pub mod rating;

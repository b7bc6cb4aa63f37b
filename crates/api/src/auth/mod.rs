//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Identity itself (sign-up, login) lives in an external service; this
//! server only verifies the tokens that service issues.

pub mod jwt;

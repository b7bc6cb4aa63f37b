//! Request extractors for authentication, authorization, and cancellation.
//!
//! - [`auth::AuthUser`] -- Extracts the caller from a Bearer token or API key.
//! - [`auth::MaybeAuthUser`] -- Same, but anonymous callers are allowed.
//! - [`rbac::RequireTrustedMember`] -- Requires the trusted-member or admin capability.
//! - [`rbac::RequireAdmin`] -- Requires the admin capability.
//! - [`cancel::RequestCancel`] -- Per-request token cancelled on shutdown.

pub mod auth;
pub mod cancel;
pub mod rbac;

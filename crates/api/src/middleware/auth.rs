//! Authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cinedex_core::error::CoreError;
use cinedex_core::types::DbId;
use uuid::Uuid;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the shared admin key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authenticated caller.
///
/// Resolved from a JWT Bearer token in the `Authorization` header, or from
/// an `x-api-key` header matching the configured key. API-key callers are
/// admins acting as the nil user id.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The caller's id in the identity service (from `claims.sub`).
    pub user_id: DbId,
    pub admin: bool,
    pub trusted_member: bool,
}

impl AuthUser {
    /// The identity an `x-api-key` caller acts as.
    pub fn api_key_admin() -> Self {
        Self {
            user_id: Uuid::nil(),
            admin: true,
            trusted_member: false,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })
    }
}

/// Caller identity for endpoints that also serve anonymous requests.
///
/// `None` when no credentials were sent. Credentials that are present but
/// invalid are still rejected with 401.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<DbId> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(resolve(parts, state)?))
    }
}

/// Shared resolution: `Ok(None)` means no credentials were supplied.
fn resolve(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, AppError> {
    if let Some(key) = parts.headers.get(API_KEY_HEADER) {
        let matches = match (&state.config.api_key, key.to_str()) {
            (Some(expected), Ok(given)) => expected == given,
            _ => false,
        };
        if !matches {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid API key".into(),
            )));
        }
        return Ok(Some(AuthUser::api_key_admin()));
    }

    let Some(auth_header) = parts.headers.get("authorization") else {
        return Ok(None);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

    let claims = validate_token(token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    Ok(Some(AuthUser {
        user_id: claims.sub,
        admin: claims.admin,
        trusted_member: claims.trusted_member,
    }))
}

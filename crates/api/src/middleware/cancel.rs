use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Cancellation signal for one request.
///
/// A child of the server's shutdown token. Dropping the handler future
/// (client disconnect, request timeout) already drops in-flight store calls;
/// this covers the case where the server itself is going away.
pub struct RequestCancel(pub CancellationToken);

impl FromRequestParts<AppState> for RequestCancel {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestCancel(state.shutdown.child_token()))
    }
}

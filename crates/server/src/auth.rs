use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use service::ServiceError;

use crate::{errors::ApiError, state::AppState};

const SCHEME: &str = "Bearer";

/// Token from `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively; a bare `Bearer` yields the empty token and any other
/// scheme yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return None;
    }
    Some(token.trim().to_string())
}

/// Middleware for mutating routes: the presented bearer token must equal the
/// token of some stored user. Any match authorizes the request; tokens are not
/// scoped to the user that owns them.
pub async fn require_bearer_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();

    let Some(token) = bearer_token(req.headers()) else {
        warn!(%path, "missing or non-bearer Authorization header");
        return Err(ServiceError::Unauthorized.into());
    };
    if token.is_empty() && !state.auth.allow_empty_token {
        warn!(%path, "empty bearer token rejected");
        return Err(ServiceError::Unauthorized.into());
    }

    match state.directory.check_token(&token).await? {
        Some(_) => Ok(next.run(req).await),
        None => {
            warn!(%path, "bearer token matches no user");
            Err(ServiceError::Unauthorized.into())
        }
    }
}

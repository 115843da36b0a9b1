//! Axum extractors for authentication.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use super::cookie::{SESSION_COOKIE_NAME, get_cookie};
use super::error::{AuthError, AuthErrorKind};
use super::state::HasAuthBackend;
use super::types::SessionPrincipal;

/// Token from the `Authorization: Bearer <token>` header, if present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Core authentication logic: extraction, verification, resolution.
/// Strictly sequential; the first failure is terminal.
async fn authenticate_request<S>(
    parts: &Parts,
    state: &S,
) -> Result<SessionPrincipal, AuthErrorKind>
where
    S: HasAuthBackend + Send + Sync,
{
    // Cookie takes absolute precedence. The Authorization header is only
    // consulted when no cookie is present at all; a cookie that fails
    // verification is not retried on the other channel.
    let token = match get_cookie(&parts.headers, SESSION_COOKIE_NAME) {
        Some(token) => token,
        None => bearer_token(&parts.headers).ok_or(AuthErrorKind::NoCredential)?,
    };

    let claims = state
        .tokens()
        .verify(token)
        .map_err(|_| AuthErrorKind::InvalidToken)?;

    // Freshness check: a structurally valid token for an account that no
    // longer resolves is rejected. Store faults also reject (fail closed).
    let user = state
        .users()
        .get_by_id(&claims.sub)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "User lookup failed during authentication");
            AuthErrorKind::UnknownSubject
        })?
        .ok_or(AuthErrorKind::UnknownSubject)?;

    Ok(user.into())
}

/// Extractor for endpoints that require an authenticated session.
/// On rejection, responds 401 and clears the session cookie.
pub struct Auth(pub SessionPrincipal);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate_request(parts, state)
            .await
            .map(Auth)
            .map_err(|kind| AuthError::new(kind, state.cookies()))
    }
}

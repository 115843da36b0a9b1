//! Session lifecycle: issuance at login, termination at logout.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use tracing::error;

use super::cookie::CookieConfig;
use super::error::{AuthError, AuthErrorKind};
use super::state::HasAuthBackend;

/// A freshly issued session: the signed token and its Set-Cookie value.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token: String,
    pub cookie: String,
}

/// Issue a new session token for a subject. Used only at login.
///
/// The identity is re-resolved so the token carries the subject's current
/// role rather than whatever a previous token claimed. Fails closed when
/// the subject does not resolve.
pub async fn create_token<S>(state: &S, subject_id: &str) -> Result<NewSession, AuthError>
where
    S: HasAuthBackend + Send + Sync,
{
    let user = state
        .users()
        .get_by_id(subject_id)
        .await
        .map_err(|e| {
            error!(error = %e, "User lookup failed during token issuance");
            AuthError::new(AuthErrorKind::UnknownSubject, state.cookies())
        })?
        .ok_or_else(|| AuthError::new(AuthErrorKind::UnknownSubject, state.cookies()))?;

    let issued = state.tokens().issue(&user.id, user.role).map_err(|e| {
        error!(error = %e, "Failed to sign session token");
        AuthError::new(AuthErrorKind::InvalidToken, state.cookies())
    })?;

    let cookie = state.cookies().session_cookie(&issued.token);

    Ok(NewSession {
        token: issued.token,
        cookie,
    })
}

/// Response headers that terminate a session on the client.
///
/// Purely a transport operation: the token itself stays valid until natural
/// expiry and is replayable via the Authorization header. Hardened mode
/// (production) additionally instructs the client to purge cookies and
/// storage.
pub fn logout_headers(cookies: &CookieConfig, hardened: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(&cookies.clear_cookie()) {
        headers.insert(header::SET_COOKIE, value);
    }

    if hardened {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
        );
        headers.insert(
            HeaderName::from_static("clear-site-data"),
            HeaderValue::from_static("\"cookies\", \"storage\""),
        );
    }

    headers
}

//! Authentication rejection types.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::cookie::CookieConfig;

/// Why an authentication attempt was rejected. Internal only: every kind
/// collapses to the same response so callers cannot distinguish a missing
/// credential from a revoked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No token on either the cookie or the header channel
    NoCredential,
    /// Malformed, tampered, or expired token
    InvalidToken,
    /// Token verified but the subject no longer resolves
    UnknownSubject,
}

/// Terminal rejection of an authentication attempt.
///
/// Responds 401 with a generic body and clears the session cookie, so a
/// client holding a poisoned credential is prompted to re-authenticate.
#[derive(Debug)]
pub struct AuthError {
    kind: AuthErrorKind,
    clear_cookie: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, cookies: &CookieConfig) -> Self {
        Self {
            kind,
            clear_cookie: cookies.clear_cookie(),
        }
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use axum::Json;
        use axum::http::{HeaderValue, StatusCode};
        use serde::Serialize;

        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        debug!(kind = ?self.kind, "Authentication rejected");

        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized",
            }),
        )
            .into_response();

        if let Ok(value) = HeaderValue::from_str(&self.clear_cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }

        response
    }
}

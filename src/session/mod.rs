//! Session authentication over stateless bearer tokens.
//!
//! Credentials ride in a cookie, with a `Bearer` Authorization header as the
//! fallback channel when no cookie is present. Verified claims are resolved
//! against the live user store on every request, so a deleted account loses
//! access immediately even though its token stays structurally valid.
//! Every failure clears the client-side credential and collapses to one
//! generic unauthorized response.

mod cookie;
mod error;
mod extractor;
mod service;
mod state;
mod types;

pub use cookie::{CookieConfig, SESSION_COOKIE_MAX_AGE_SECS, SESSION_COOKIE_NAME, get_cookie};
pub use error::{AuthError, AuthErrorKind};
pub use extractor::Auth;
pub use service::{NewSession, create_token, logout_headers};
pub use state::HasAuthBackend;
pub use types::SessionPrincipal;

//! Session cookie parsing and attribute handling.

use axum::http::header;

/// Cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "weather_sync_token";

/// Cookie lifetime: 30 days, matching the token lifetime.
pub const SESSION_COOKIE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Transport attributes for the session cookie, fixed at startup.
///
/// Production gets `Secure` and `SameSite=Strict`; development keeps `Lax`
/// so the cookie survives cross-port redirects on localhost.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    secure: bool,
    same_site: &'static str,
}

impl CookieConfig {
    pub fn for_environment(production: bool) -> Self {
        Self {
            secure: production,
            same_site: if production { "Strict" } else { "Lax" },
        }
    }

    /// Set-Cookie value carrying a session token.
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; SameSite={}; Path=/; Max-Age={}{}",
            SESSION_COOKIE_NAME,
            token,
            self.same_site,
            SESSION_COOKIE_MAX_AGE_SECS,
            self.secure_suffix()
        )
    }

    /// Set-Cookie value that clears the session cookie.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; SameSite={}; Path=/; Max-Age=0{}",
            SESSION_COOKIE_NAME,
            self.same_site,
            self.secure_suffix()
        )
    }

    fn secure_suffix(&self) -> &'static str {
        if self.secure { "; Secure" } else { "" }
    }
}

mod auth;
mod error;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::rate_limit::RateLimitConfig;
use crate::session::CookieConfig;
use crate::token::TokenCodec;
use crate::users::UserRepository;

pub use error::{ApiError, ResultExt};

/// Create the API router.
pub fn create_api_router(
    user_repo: UserRepository,
    tokens: Arc<TokenCodec>,
    cookies: CookieConfig,
    hardened: bool,
    rate_limits: Arc<RateLimitConfig>,
) -> Router {
    let auth_state = auth::AuthState {
        users: user_repo.clone(),
        tokens: tokens.clone(),
        cookies: cookies.clone(),
        hardened,
    };

    let users_state = users::UsersState {
        users: user_repo,
        tokens,
        cookies,
    };

    Router::new()
        .nest("/auth", auth::router(auth_state, rate_limits))
        .nest("/users", users::router(users_state))
}

//! Registration, login, and logout endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::db::{NewUser, NotificationPref};
use crate::impl_has_auth_backend;
use crate::password;
use crate::rate_limit::{RateLimitConfig, rate_limit_login, rate_limit_register};
use crate::session::{Auth, CookieConfig, SessionPrincipal, create_token, logout_headers};
use crate::token::TokenCodec;
use crate::users::UserRepository;

#[derive(Clone)]
pub struct AuthState {
    pub users: UserRepository,
    pub tokens: Arc<TokenCodec>,
    pub cookies: CookieConfig,
    pub hardened: bool,
}

impl_has_auth_backend!(AuthState);

pub fn router(state: AuthState, rate_limits: Arc<RateLimitConfig>) -> Router {
    let register_routes = Router::new()
        .route("/register", post(register))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            rate_limits.clone(),
            rate_limit_register,
        ));

    let login_routes = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(rate_limits, rate_limit_login));

    let logout_routes = Router::new()
        .route("/logout", post(logout))
        .with_state(state);

    Router::new()
        .merge(register_routes)
        .merge(login_routes)
        .merge(logout_routes)
}

#[derive(Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    phone_number: String,
    notifications: Option<NotificationPref>,
}

#[derive(Serialize)]
struct RegisterResponse {
    status: &'static str,
    message: &'static str,
    response: SessionPrincipal,
}

async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim();

    if name.is_empty() {
        return Err(ApiError::bad_request("Name cannot be empty"));
    }

    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }

    if payload.password.trim().is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }

    let existing = state
        .users
        .find_by_email(email)
        .await
        .db_err("Failed to check email availability")?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email already in use"));
    }

    let hashed = password::hash_password(payload.password.trim())
        .map_err(|e| ApiError::db_error("Failed to hash password", e))?;

    let user = state
        .users
        .create(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: hashed,
            phone_number: payload.phone_number.trim().to_string(),
            notifications: payload.notifications.unwrap_or(NotificationPref::Yes),
        })
        .await
        .db_err("Failed to create user")?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "success",
            message: "User registered successfully",
            response: user.into(),
        }),
    ))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    status: &'static str,
    message: &'static str,
    token: String,
}

async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // One generic message for a missing account and a wrong password, so
    // login cannot be used to probe which emails are registered.
    const WRONG_CREDENTIALS: &str = "Invalid email or password";

    let user = state
        .users
        .find_by_email(payload.email.trim())
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized(WRONG_CREDENTIALS))?;

    if !password::verify_password(&payload.password, &user.password) {
        return Err(ApiError::unauthorized(WRONG_CREDENTIALS));
    }

    let session = create_token(&state, &user.id)
        .await
        .map_err(|_| ApiError::unauthorized(WRONG_CREDENTIALS))?;

    let mut headers = HeaderMap::new();
    let cookie = HeaderValue::from_str(&session.cookie)
        .map_err(|e| ApiError::db_error("Failed to build session cookie", e))?;
    headers.insert(header::SET_COOKIE, cookie);

    Ok((
        headers,
        Json(LoginResponse {
            status: "success",
            message: "Login successful",
            token: session.token,
        }),
    ))
}

#[derive(Serialize)]
struct LogoutResponse {
    status: &'static str,
    message: &'static str,
}

async fn logout(State(state): State<AuthState>, Auth(_principal): Auth) -> impl IntoResponse {
    let headers = logout_headers(&state.cookies, state.hardened);

    (
        headers,
        Json(LogoutResponse {
            status: "success",
            message: "Logout successful",
        }),
    )
}

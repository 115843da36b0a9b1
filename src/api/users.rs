//! Authenticated user endpoints.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::db::NotificationPref;
use crate::impl_has_auth_backend;
use crate::session::{Auth, CookieConfig, SessionPrincipal};
use crate::token::TokenCodec;
use crate::users::UserRepository;

#[derive(Clone)]
pub struct UsersState {
    pub users: UserRepository,
    pub tokens: Arc<TokenCodec>,
    pub cookies: CookieConfig,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/me/notifications", patch(update_notifications))
        .route("/notifiable", get(notifiable))
        .with_state(state)
}

#[derive(Serialize)]
struct MeResponse {
    status: &'static str,
    response: SessionPrincipal,
}

async fn me(Auth(principal): Auth) -> impl IntoResponse {
    Json(MeResponse {
        status: "success",
        response: principal,
    })
}

#[derive(Deserialize)]
struct UpdateNotificationsRequest {
    notifications: NotificationPref,
}

#[derive(Serialize)]
struct UpdateNotificationsResponse {
    status: &'static str,
    message: &'static str,
}

async fn update_notifications(
    State(state): State<UsersState>,
    Auth(principal): Auth,
    Json(payload): Json<UpdateNotificationsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .users
        .set_notifications(&principal.id, payload.notifications)
        .await
        .db_err("Failed to update notification preference")?;

    if !updated {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(Json(UpdateNotificationsResponse {
        status: "success",
        message: "Notification preference updated",
    }))
}

#[derive(Serialize)]
struct NotifiableResponse {
    status: &'static str,
    message: &'static str,
    response: Vec<SessionPrincipal>,
}

async fn notifiable(
    State(state): State<UsersState>,
    Auth(_principal): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .users
        .users_to_notify()
        .await
        .db_err("Failed to load notification roster")?;

    Ok(Json(NotifiableResponse {
        status: "success",
        message: "Users to receive the weather digest",
        response: users.into_iter().map(Into::into).collect(),
    }))
}

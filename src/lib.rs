pub mod api;
pub mod cache;
pub mod cli;
pub mod db;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token;
pub mod users;

use api::create_api_router;
use axum::{Json, Router, routing::get};
use cache::{CacheRepository, CacheStore};
use cli::Environment;
use db::Database;
use rate_limit::RateLimitConfig;
use session::CookieConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use token::TokenCodec;
use tokio::net::TcpListener;
use users::UserRepository;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Cache store shared across all requests
    pub cache: Arc<dyn CacheStore>,
    /// JWT secret for signing session tokens
    pub jwt_secret: Vec<u8>,
    /// Deployment environment (controls cookie attributes and hardened logout)
    pub environment: Environment,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let tokens = Arc::new(TokenCodec::new(&config.jwt_secret));
    let cache = CacheRepository::new(config.cache.clone());
    let user_repo = UserRepository::new(config.db.users(), cache);
    let cookies = CookieConfig::for_environment(config.environment.is_production());
    let rate_limits = Arc::new(RateLimitConfig::new());

    let api_router = create_api_router(
        user_repo,
        tokens,
        cookies,
        config.environment.is_production(),
        rate_limits,
    );

    Router::new()
        .route("/health-check", get(health_check))
        .merge(api_router)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}

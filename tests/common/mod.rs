#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use weathersync::cache::{CacheError, CacheRepository, CacheStore, MemoryStore};
use weathersync::cli::Environment;
use weathersync::db::Database;
use weathersync::token::TokenCodec;
use weathersync::users::UserRepository;
use weathersync::{ServerConfig, create_app};

pub const JWT_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough";

pub struct TestContext {
    pub app: Router,
    pub db: Database,
    pub cache: Arc<MemoryStore>,
    pub codec: TokenCodec,
}

impl TestContext {
    /// Repository wired to the same database and cache as the app, for
    /// mutating state behind the server's back the way an operator would.
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.db.users(), CacheRepository::new(self.cache.clone()))
    }
}

pub async fn setup() -> TestContext {
    setup_with_environment(Environment::Test).await
}

pub async fn setup_with_environment(environment: Environment) -> TestContext {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let cache = Arc::new(MemoryStore::new());

    let config = ServerConfig {
        db: db.clone(),
        cache: cache.clone(),
        jwt_secret: JWT_SECRET.to_vec(),
        environment,
    };

    TestContext {
        app: create_app(&config),
        db,
        cache,
        codec: TokenCodec::new(JWT_SECRET),
    }
}

/// App wired to a cache whose backend always fails, for exercising the
/// fail-open path.
pub async fn setup_with_unreachable_cache() -> TestContext {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");

    let config = ServerConfig {
        db: db.clone(),
        cache: Arc::new(DownStore),
        jwt_secret: JWT_SECRET.to_vec(),
        environment: Environment::Test,
    };

    TestContext {
        app: create_app(&config),
        db,
        cache: Arc::new(MemoryStore::new()),
        codec: TokenCodec::new(JWT_SECRET),
    }
}

/// Cache store whose backend is unreachable.
pub struct DownStore;

#[async_trait]
impl CacheStore for DownStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
    async fn set(&self, _key: &str, _value: &str, _ttl_secs: i64) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
    async fn delete_prefix(&self, _prefix: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

/// Request builder for driving the router in tests.
pub struct TestRequest {
    method: &'static str,
    uri: String,
    body: Option<Value>,
    cookie: Option<String>,
    bearer: Option<String>,
    client_ip: [u8; 4],
}

impl TestRequest {
    pub fn new(method: &'static str, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            body: None,
            cookie: None,
            bearer: None,
            client_ip: [127, 0, 0, 1],
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn session_cookie(mut self, token: &str) -> Self {
        self.cookie = Some(format!("weather_sync_token={}", token));
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    pub fn from_ip(mut self, ip: [u8; 4]) -> Self {
        self.client_ip = ip;
        self
    }

    pub async fn send(self, app: &Router) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);

        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(bearer) = &self.bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
        }

        let mut request = match &self.body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("Failed to build request"),
            None => builder.body(Body::empty()).expect("Failed to build request"),
        };

        // Rate limiting keys on the accept-time connection info
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((self.client_ip, 40000))));

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            // Most responses are JSON; some (e.g. the rate-limit middleware's
            // plain-text 429) are not. Fall back to Null rather than panicking
            // so callers that only inspect the status are unaffected.
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, headers, body)
    }
}

/// Register a user and return the created record from the response.
pub async fn register_user(ctx: &TestContext, email: &str, password: &str) -> Value {
    let (status, _, body) = TestRequest::new("POST", "/auth/register")
        .json(serde_json::json!({
            "name": "Alice",
            "email": email,
            "password": password,
            "phone_number": "5511999990000",
        }))
        .send(&ctx.app)
        .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["response"].clone()
}

/// Log in and return the issued token.
pub async fn login_user(ctx: &TestContext, email: &str, password: &str) -> String {
    let (status, _, body) = TestRequest::new("POST", "/auth/login")
        .json(serde_json::json!({ "email": email, "password": password }))
        .send(&ctx.app)
        .await;

    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().expect("token missing").to_string()
}

/// Value of the first Set-Cookie header, if any.
pub fn set_cookie(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok())
}

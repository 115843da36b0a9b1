//! CLI argument parsing, validation, and startup helpers.

use clap::Parser;
use tracing::{error, info};
use url::Url;

use crate::db::Database;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Deployment environment. Production turns on Secure/SameSite=Strict
/// cookies and the hardened logout headers.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Weathersync",
    about = "Weather digest notifications with session authentication"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "APP_PORT")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "weathersync.db")]
    pub database: String,

    /// Deployment environment
    #[arg(short, long, value_enum, default_value = "development", env = "APP_ENV")]
    pub environment: Environment,

    /// Public base URL of the service
    #[arg(long, default_value = "http://localhost:8080", env = "BASE_URL")]
    pub base_url: String,

    /// Path to file containing the JWT signing secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Parse and validate the base URL.
/// Returns None and logs an error if validation fails.
pub fn validate_base_url(base_url: &str, environment: Environment) -> Option<Url> {
    let url = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            error!(url = %base_url, error = %e, "Invalid base URL");
            return None;
        }
    };

    if environment.is_production() && url.scheme() != "https" {
        error!("Base URL must use HTTPS in production");
        return None;
    }

    Some(url)
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

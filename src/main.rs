use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use weathersync::ServerConfig;
use weathersync::cache::MemoryStore;
use weathersync::cli::{Args, init_logging, load_jwt_secret, open_database, validate_base_url};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(base_url) = validate_base_url(&args.base_url, args.environment) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let config = ServerConfig {
        db,
        cache: Arc::new(MemoryStore::new()),
        jwt_secret: jwt_secret.into_bytes(),
        environment: args.environment,
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().unwrap();
    info!(
        address = %local_addr,
        base_url = %base_url,
        environment = ?args.environment,
        "Listening"
    );

    if let Err(e) = weathersync::run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

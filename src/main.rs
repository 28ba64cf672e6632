//! The binary entry point for the application.

use std::sync::Arc;
use std::time::Duration;

use app_core::config::Config;
use app_core::middleware::request_response_logger;
use app_core::oauth::{builtin_specs, OAuthRegistry, StandardOAuthClient};
use axum::http::StatusCode;
use axum::{middleware, routing, Json, Router};
use base64::engine::general_purpose;
use base64::Engine as _;
use bb8_redis::bb8::Pool;
use bb8_redis::RedisConnectionManager;
use mongodb::options::ClientOptions;
use mongodb::Client;
use tokio::signal;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    if let Err(err) = run().await {
        panic!("Application failed to start: {err}");
    }
}

/// Initializes all dependencies and starts the web server.
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(
        Config::builder("config/config.yaml")
            .watch_interval(Duration::from_secs(5))
            .watch()
            .build()?,
    );

    // MongoDB client for the identity store.
    let mut db_opt = ClientOptions::parse(config.get::<String>("database.uri")?).await?;
    db_opt.max_pool_size = Some(config.get("database.max_pool_size")?);
    db_opt.server_selection_timeout = Some(Duration::from_secs(config.get("database.selection_timeout_secs")?));
    let db = Client::with_options(db_opt)?.database(&config.get::<String>("database.name")?);

    // Redis pool for the session store.
    let rds_manager = RedisConnectionManager::new(config.get::<String>("redis.url")?)?;
    let rds_pool = Pool::builder()
        .max_size(config.get::<u32>("redis.max_connections")?)
        .build(rds_manager)
        .await?;

    // Key for signing the session cookie and sealing the OAuth state cookie.
    let cookie_key = Key::from(&general_purpose::STANDARD.decode(config.get::<String>("session.secret")?)?);

    // Register every provider that has credentials configured; the others
    // simply stay unavailable.
    let mut oauth = OAuthRegistry::new();
    for spec in builtin_specs() {
        let Ok(client_id) = config.get::<String>(&format!("oauth.{}.client_id", spec.name)) else {
            continue;
        };
        if client_id.is_empty() {
            continue;
        }
        let client_secret = config.get(&format!("oauth.{}.client_secret", spec.name))?;
        let redirect_uri = config.get(&format!("oauth.{}.redirect_uri", spec.name))?;

        let adapter = StandardOAuthClient::new(spec, client_id, client_secret, redirect_uri)?;
        oauth.register(spec.name, Arc::new(adapter));
        tracing::info!(provider = spec.name, "OAuth provider registered");
    }

    let auth_state = auth::new(auth::Dependency {
        db,
        rds: rds_pool,
        config: config.clone(),
        oauth,
        cookie_key,
    });

    let timeout_secs = Duration::from_secs(config.get::<u64>("server.timeout_secs")?);
    let app = Router::new()
        .merge(auth::create_router(auth_state))
        .route(
            "/health",
            routing::get(|| async { Json(serde_json::json!({"status": "ok"})) }),
        )
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"message": "Endpoint not found"})),
            )
        })
        .method_not_allowed_fallback(|| async {
            (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(serde_json::json!({"message": "Method not allowed"})),
            )
        })
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_response_logger))
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
                .layer(RequestDecompressionLayer::new())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout_secs)),
        );

    let server_address = config.get::<String>("server.address")?;
    let listener = tokio::net::TcpListener::bind(&server_address).await?;

    tracing::info!("Listening on {}", listener.local_addr()?);

    let (shutdown_tx, _) = broadcast::channel(1);
    spawn_shutdown_listener(shutdown_tx.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_tx.subscribe().recv().await.ok();
            tracing::info!("Server is shutting down gracefully");
        })
        .await?;

    Ok(())
}

/// Spawns a background task to listen for system shutdown signals.
fn spawn_shutdown_listener(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("Received SIGINT (Ctrl+C)") },
            _ = terminate => { tracing::info!("Received SIGTERM") },
        }

        if shutdown_tx.send(()).is_err() {
            tracing::error!("Failed to send shutdown signal");
        }
    });
}

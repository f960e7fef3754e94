//! Libris Server - Library Management System
//!
//! A Rust REST API server for library management.

use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("libris_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Libris Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool. Every connection gets a statement
    // timeout so a wedged query cannot hold a borrow transaction open
    // forever.
    let statement_timeout_ms = config.database.statement_timeout_secs * 1000;
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET statement_timeout = {}", statement_timeout_ms))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone(), config.chat.clone());

    // Bootstrap the default admin account on first run
    services
        .auth
        .ensure_default_admin()
        .await
        .expect("Failed to bootstrap admin account");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration: explicit origins in production, permissive in
    // development when none are configured
    let cors = if state.config.cors.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Borrowing
        .route("/borrow/querypage", get(api::borrows::query_page))
        .route("/borrow/borrow", post(api::borrows::borrow))
        .route("/borrow/return", post(api::borrows::return_borrow))
        .route("/borrow/renew", post(api::borrows::renew))
        // Catalog
        .route("/book/querypage", get(api::books::query_page))
        .route("/book/available", get(api::books::available))
        .route("/book/get", get(api::books::get))
        .route("/book/add", post(api::books::add))
        .route("/book/update", put(api::books::update))
        .route("/book/changestatus", post(api::books::change_status))
        .route("/book/delete", delete(api::books::delete))
        // Patrons
        .route("/user/querypage", get(api::users::query_page))
        .route("/user/get", get(api::users::get))
        .route("/user/add", post(api::users::add))
        .route("/user/update", put(api::users::update))
        .route("/user/changestatus", post(api::users::change_status))
        .route("/user/delete", delete(api::users::delete))
        // Categories
        .route("/category/list", get(api::categories::list))
        .route("/category/querypage", get(api::categories::query_page))
        .route("/category/add", post(api::categories::add))
        .route("/category/update", put(api::categories::update))
        .route("/category/delete", delete(api::categories::delete))
        // Publishers
        .route("/publisher/list", get(api::publishers::list))
        .route("/publisher/querypage", get(api::publishers::query_page))
        .route("/publisher/add", post(api::publishers::add))
        .route("/publisher/update", put(api::publishers::update))
        .route("/publisher/delete", delete(api::publishers::delete))
        // Reports
        .route("/report/summary", get(api::reports::summary))
        .route("/report/bookstats", get(api::reports::book_stats))
        .route("/report/borrowtrend", get(api::reports::borrow_trend))
        // Chat assistant
        .route("/chat/stream", post(api::chat::stream))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    routes
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

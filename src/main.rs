//! Libris Server - Library Management REST API

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libris_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Libris Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(config.database.timeout())
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(
        config.server.host.parse().context("invalid server host")?,
        config.server.port,
    );

    let services = Services::new(Repository::new(pool), &config).context("invalid auth configuration")?;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Users
        .route("/users", post(api::users::register).get(api::users::list_users))
        .route("/users/login", post(api::users::login))
        .route("/users/refresh", post(api::users::refresh))
        .route("/users/me", get(api::users::me))
        .route("/users/name/:username", get(api::users::get_user_by_username))
        .route(
            "/users/:user_id",
            get(api::users::get_user).put(api::users::update_user),
        )
        // Books
        .route("/books", post(api::books::create_book).get(api::books::list_books))
        .route("/books/:id", get(api::books::get_book).put(api::books::update_book))
        .route("/books/name/:name", get(api::books::search_by_name))
        .route("/books/author/:author", get(api::books::search_by_author))
        .route("/books/type/:type", get(api::books::search_by_type))
        .route("/books/available/:flag", get(api::books::list_by_availability))
        // Fines
        .route("/fines", post(api::fines::create_fine).get(api::fines::list_fines))
        .route("/fines/:id", get(api::fines::get_fine).put(api::fines::update_fine))
        .route(
            "/fine-records",
            post(api::fines::create_fine_record).get(api::fines::list_fine_records),
        )
        .route(
            "/fine-records/:id",
            get(api::fines::get_fine_record).put(api::fines::update_fine_record),
        )
        // Orders
        .route("/orders", post(api::orders::create_order).get(api::orders::list_orders))
        .route("/orders/:id", get(api::orders::get_order).put(api::orders::update_order))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}

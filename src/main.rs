use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod db;
mod error;
mod models;
mod render;
mod services;
mod utils;

use config::Config;
use constants::API_VERSION;
use db::Database;
use services::{GameCache, JwtTokenService, RedisGameCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "squirrel_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting squirrel game backend");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!("Cache: {}", config.cache_name);

    // Initialize database
    let db = Database::new(&config).await?;

    tracing::info!("Running database migrations...");
    db.run_migrations().await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    let redis_manager = redis::aio::ConnectionManager::new(redis).await?;
    let cache: Arc<dyn GameCache> = Arc::new(RedisGameCache::new(
        redis_manager,
        &config.cache_name,
        config.roster_ttl_secs,
    ));

    let tokens = Arc::new(JwtTokenService::new(&config.token_signing_secret));

    let app_state = api::AppState::new(Arc::new(db), tokens, cache.clone(), config.clone());

    // Build router
    let app = build_router(app_state);

    // Start background services
    tokio::spawn(services::start_background_services(cache, config.clone()));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Game page
        .route("/", get(api::play::play_game))
        // Health check
        .route("/health", get(api::health::health_check))
        // Players
        .route("/api/v1/users/level-up", post(api::level::level_up_user))
        // Game state
        .route("/api/v1/game/state", get(api::game::get_game_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

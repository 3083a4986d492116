//! Solar Planner Platform - Backend Server
//!
//! Recommends residential solar panel setups from a user's location, a year
//! of historical weather and their consumption answers.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod middleware;
mod routes;
mod services;

pub use config::Config;

use external::{GeminiClient, GeocodingClient, WeatherClient};
use services::WebhookVerifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub weather: WeatherClient,
    pub geocoder: GeocodingClient,
    pub gemini: GeminiClient,
    pub webhook: WebhookVerifier,
}

impl AppState {
    /// Build the outbound clients from configuration
    pub fn new(db: sqlx::PgPool, config: Config) -> anyhow::Result<Self> {
        let weather = WeatherClient::new(
            config.weather.archive_url.clone(),
            config.weather.timezone.clone(),
            Duration::from_secs(config.weather.timeout_secs),
        )?;
        let geocoder = GeocodingClient::new(
            config.geocoding.base_url.clone(),
            &config.geocoding.user_agent,
            Duration::from_secs(config.geocoding.timeout_secs),
        )?;
        let gemini = GeminiClient::new(
            config.gemini.api_key.clone(),
            config.gemini.base_url.clone(),
            config.gemini.model.clone(),
            config.gemini.temperature,
            config.gemini.top_p,
            Duration::from_secs(config.gemini.timeout_secs),
        )?;
        let webhook = WebhookVerifier::new(&config.webhook.secret, config.webhook.tolerance_secs)
            .map_err(|e| anyhow::anyhow!("Webhook secret: {}", e))?;

        Ok(Self {
            db,
            config: Arc::new(config),
            weather,
            geocoder,
            gemini,
            webhook,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    init_tracing(&config.environment);

    tracing::info!("Starting Solar Planner Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));

    let state = AppState::new(db_pool, config)?;
    let app = create_app(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Pretty logs in development, JSON lines everywhere else
fn init_tracing(environment: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "solar_server=debug,tower_http=debug,sqlx=warn".into());

    let (pretty, json) = if environment == "development" {
        (Some(tracing_subscriber::fmt::layer()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(routes::integration_routes())
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Solar Planner API v1.0"
}

/// Liveness probe
async fn health_check() -> &'static str {
    "OK"
}

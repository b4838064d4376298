//! Farm Insights Platform - Backend Server
//!
//! Serves farmer onboarding, the aggregated farmer data API and the
//! debug-user diagnostic endpoint.

use std::{sync::Arc, time::Duration};

use farm_insights_backend::{
    create_app,
    external::DataProviders,
    services::{InMemoryProfileRepository, PgProfileRepository, ProfileRepository},
    AppState, Config,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "farm_server=debug,farm_insights_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Farm Insights Server");
    tracing::info!("Environment: {}", config.environment);

    let profiles: Arc<dyn ProfileRepository> = match &config.database.url {
        Some(url) if !url.is_empty() => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(url)
                .await?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&db_pool).await?;
            tracing::info!("Migrations completed");

            Arc::new(PgProfileRepository::new(db_pool))
        }
        _ => {
            tracing::warn!("No database URL configured; profiles are kept in memory");
            Arc::new(InMemoryProfileRepository::new())
        }
    };

    let providers = DataProviders::from_config(&config);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = AppState::new(config, profiles, providers);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

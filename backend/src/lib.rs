//! Farm Insights Platform - Backend
//!
//! Farmer onboarding and a data aggregator merging weather, forecast, UV,
//! NDVI and soil data into one record per farmer.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;

use external::DataProviders;
use services::{FarmerDataAggregator, ProfileRepository, ProfileService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub aggregator: Arc<FarmerDataAggregator>,
    pub profile_service: Arc<ProfileService>,
}

impl AppState {
    pub fn new(config: Config, profiles: Arc<dyn ProfileRepository>, providers: DataProviders) -> Self {
        let profile_service = ProfileService::new(
            profiles.clone(),
            providers.weather.clone(),
            config.aggregator.source_timeout(),
        );
        let aggregator = FarmerDataAggregator::new(profiles.clone(), providers, config.aggregator.clone());

        Self {
            config: Arc::new(config),
            profiles,
            aggregator: Arc::new(aggregator),
            profile_service: Arc::new(profile_service),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Farm Insights Platform API"
}

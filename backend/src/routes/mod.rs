//! Route definitions for the Farm Insights Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Diagnostics
        .route("/debug-user", get(handlers::debug_user))
        // Aggregated farmer data
        .route("/farmer-data", get(handlers::get_farmer_data))
        // Onboarding
        .route("/comprehensive-profile", post(handlers::create_comprehensive_profile))
}

//! HTTP handlers for farmer profile onboarding

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::models::{ProfileResponse, ProfileSubmission};
use crate::AppState;

/// Create a farmer profile from the onboarding submission
pub async fn create_comprehensive_profile(
    State(state): State<AppState>,
    Json(submission): Json<ProfileSubmission>,
) -> AppResult<(StatusCode, Json<ProfileResponse>)> {
    let response = state.profile_service.create_profile(submission).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

//! Client-side completion of the onboarding flow
//!
//! After the single profile POST, the browser either persists the result and
//! moves on to the dashboard, or tells the farmer what went wrong and stays
//! put. The browser specifics live behind [`ClientStorage`] and
//! [`OnboardingUi`] so the flow can run outside a browser.

use serde::{Deserialize, Serialize};

use crate::models::{AiInsights, FarmField, ProfileResponse, ProfileSubmission, WeatherSnapshot};

pub const USER_DATA_KEY: &str = "userData";
pub const FARM_FIELDS_KEY: &str = "farmFields";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// String-keyed persistent storage (localStorage in the browser)
pub trait ClientStorage {
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), String>;
    fn remove_item(&mut self, key: &str) -> Result<(), String>;
}

/// Blocking alert and navigation
pub trait OnboardingUi {
    fn alert(&mut self, message: &str);
    fn navigate(&mut self, path: &str);
}

/// Result of the one profile-creation request
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Accepted(ProfileResponse),
    Rejected { status: u16, error: Option<String> },
    NetworkError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingError {
    #[error("Failed to create profile: {0}")]
    Rejected(String),

    #[error("Could not reach the server: {0}")]
    Network(String),

    #[error("Could not save your profile on this device: {0}")]
    Storage(String),

    #[error("Could not prepare profile data: {0}")]
    Serialization(String),
}

/// Record persisted under [`USER_DATA_KEY`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredUserData {
    pub user_id: String,
    pub full_name: String,
    pub mobile: String,
    pub pincode: String,
    pub crop_name: String,
    pub soil_type: String,
    pub irrigation_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<AiInsights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<WeatherSnapshot>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl StoredUserData {
    pub fn combine(submission: &ProfileSubmission, response: &ProfileResponse) -> Self {
        let profile = &response.profile.profile;
        Self {
            user_id: profile.user_id.clone(),
            full_name: submission.full_name.clone(),
            mobile: profile.mobile.clone(),
            pincode: profile.pincode.clone(),
            crop_name: profile.crop_name.clone(),
            soil_type: profile.soil_type.clone(),
            irrigation_method: profile.irrigation_method.clone(),
            ai_insights: response.profile.ai_insights.clone(),
            weather_data: response.profile.weather_data.clone(),
            recommendations: response.recommendations.clone(),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, OnboardingError> {
    serde_json::to_string(value).map_err(|e| OnboardingError::Serialization(e.to_string()))
}

fn persist(
    storage: &mut dyn ClientStorage,
    user_data: &StoredUserData,
    fields: &[FarmField],
) -> Result<(), OnboardingError> {
    let user_json = encode(user_data)?;
    let fields_json = encode(&fields)?;
    storage
        .set_item(USER_DATA_KEY, &user_json)
        .map_err(OnboardingError::Storage)?;
    // Both keys or neither: the dashboard treats userData as "onboarded"
    if let Err(e) = storage.set_item(FARM_FIELDS_KEY, &fields_json) {
        let _ = storage.remove_item(USER_DATA_KEY);
        return Err(OnboardingError::Storage(e));
    }
    Ok(())
}

/// Finish onboarding for one submission attempt. There is no retry: on any
/// failure the farmer sees one alert and stays on the onboarding screen.
pub fn complete_onboarding(
    submission: &ProfileSubmission,
    outcome: SubmissionOutcome,
    storage: &mut dyn ClientStorage,
    ui: &mut dyn OnboardingUi,
) -> Result<StoredUserData, OnboardingError> {
    let result = match outcome {
        SubmissionOutcome::Accepted(response) => {
            let user_data = StoredUserData::combine(submission, &response);
            persist(storage, &user_data, &submission.farm_fields).map(|_| user_data)
        }
        SubmissionOutcome::Rejected { status, error } => Err(OnboardingError::Rejected(
            error.unwrap_or_else(|| format!("server responded with status {}", status)),
        )),
        SubmissionOutcome::NetworkError(message) => Err(OnboardingError::Network(message)),
    };

    match &result {
        Ok(_) => ui.navigate(DASHBOARD_PATH),
        Err(error) => ui.alert(&error.to_string()),
    }
    result
}

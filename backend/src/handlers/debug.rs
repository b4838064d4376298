//! Diagnostic view over the aggregated farmer record
//!
//! `GET /api/debug-user?userId=<id>` runs a best-effort aggregation with a
//! one week lookback and reshapes the record into availability flags,
//! counts and a small sample of the actual values.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::{
    AggregationMode, DataSource, FarmerData, FetchOptions, ForecastEntry, NdviReading, SoilReading,
    WeatherSnapshot,
};
use crate::AppState;

/// Lookback used for the diagnostic aggregation
pub const DEBUG_HISTORY_DAYS: u32 = 7;
/// Forecast entries sampled into `actualData.upcomingForecast`
pub const UPCOMING_FORECAST_SAMPLE: usize = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugUserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary<'a> {
    pub user_id: Option<&'a str>,
    pub crop_name: Option<&'a str>,
    pub soil_type: Option<&'a str>,
    pub sowing_date: Option<NaiveDate>,
    pub irrigation_method: Option<&'a str>,
    pub farm_size: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct DataAvailability {
    pub weather: bool,
    pub ndvi: bool,
    pub soil: bool,
    pub uv: bool,
    pub forecast: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCounts {
    pub ndvi_entries: usize,
    pub soil_entries: usize,
    pub forecast_entries: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualData<'a> {
    pub weather: Option<&'a WeatherSnapshot>,
    pub latest_ndvi: Option<&'a NdviReading>,
    pub latest_soil: Option<&'a SoilReading>,
    pub uv_index: Option<Decimal>,
    pub upcoming_forecast: &'a [ForecastEntry],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugReport<'a> {
    pub user_id: &'a str,
    pub timestamp: DateTime<Utc>,
    pub profile: ProfileSummary<'a>,
    pub data_availability: DataAvailability,
    pub data_counts: DataCounts,
    pub actual_data: ActualData<'a>,
    pub data_completeness: u8,
    pub last_updated: DateTime<Utc>,
}

impl<'a> DebugReport<'a> {
    pub fn new(data: &'a FarmerData, timestamp: DateTime<Utc>) -> Self {
        let profile = data.profile();
        let forecast = data.forecast();

        Self {
            user_id: data.user_id(),
            timestamp,
            profile: ProfileSummary {
                user_id: profile.map(|p| p.user_id.as_str()),
                crop_name: profile.map(|p| p.crop_name.as_str()),
                soil_type: profile.map(|p| p.soil_type.as_str()),
                sowing_date: profile.map(|p| p.sowing_date),
                irrigation_method: profile.map(|p| p.irrigation_method.as_str()),
                farm_size: profile.map(|p| p.farm_size_acres),
            },
            data_availability: DataAvailability {
                weather: data.has(DataSource::Weather),
                ndvi: data.has(DataSource::Ndvi),
                soil: data.has(DataSource::Soil),
                uv: data.has(DataSource::Uv),
                forecast: data.has(DataSource::Forecast),
            },
            data_counts: DataCounts {
                ndvi_entries: data.ndvi_data().len(),
                soil_entries: data.soil_data().len(),
                forecast_entries: forecast.len(),
            },
            actual_data: ActualData {
                weather: data.current_weather(),
                latest_ndvi: data.ndvi_data().first(),
                latest_soil: data.soil_data().first(),
                uv_index: data.uv_index(),
                upcoming_forecast: &forecast[..forecast.len().min(UPCOMING_FORECAST_SAMPLE)],
            },
            data_completeness: data.data_completeness(),
            last_updated: data.last_updated(),
        }
    }
}

/// Reshape an aggregated record into the diagnostic JSON body
pub fn build_debug_report(data: &FarmerData, timestamp: DateTime<Utc>) -> AppResult<serde_json::Value> {
    serde_json::to_value(DebugReport::new(data, timestamp))
        .map_err(|e| AppError::Internal(format!("Failed to serialize debug report: {}", e)))
}

pub fn debug_options() -> FetchOptions {
    FetchOptions {
        include_historical_data: true,
        max_history_days: DEBUG_HISTORY_DAYS,
        mode: AggregationMode::BestEffort,
    }
}

/// Debug endpoint handler
pub async fn debug_user(State(state): State<AppState>, Query(query): Query<DebugUserQuery>) -> Response {
    let Some(user_id) = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "UserId parameter is required" })),
        )
            .into_response();
    };

    tracing::debug!(user_id, "Debugging farmer data");

    let report = match state.aggregator.get_farmer_data(user_id, &debug_options()).await {
        Ok(data) => build_debug_report(&data, Utc::now()),
        Err(e) => Err(e),
    };

    match report {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            tracing::error!(user_id, error = %e, "Failed to debug user data");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to debug user data",
                    "details": e.to_string(),
                    "timestamp": Utc::now(),
                })),
            )
                .into_response()
        }
    }
}

//! HTTP handler for the aggregated farmer record

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{AggregationMode, FarmerData, FetchOptions};
use crate::services::aggregator::{describe_missing, Aggregation};
use crate::AppState;

/// Query parameters for `GET /api/farmer-data`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerDataQuery {
    pub user_id: Option<String>,
    pub include_historical_data: Option<bool>,
    pub max_history_days: Option<u32>,
    pub require_all_data: Option<bool>,
}

impl FarmerDataQuery {
    pub fn fetch_options(&self) -> FetchOptions {
        let defaults = FetchOptions::default();
        FetchOptions {
            include_historical_data: self
                .include_historical_data
                .unwrap_or(defaults.include_historical_data),
            max_history_days: self.max_history_days.unwrap_or(defaults.max_history_days),
            mode: AggregationMode::from_require_all(self.require_all_data.unwrap_or(false)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerDataResponse {
    /// `complete` or `partial`
    pub outcome: &'static str,
    pub missing: Vec<String>,
    #[serde(flatten)]
    pub data: FarmerData,
}

/// Get the merged farmer record
pub async fn get_farmer_data(
    State(state): State<AppState>,
    Query(query): Query<FarmerDataQuery>,
) -> AppResult<Json<FarmerDataResponse>> {
    let user_id = query.user_id.clone().unwrap_or_default();
    let aggregation = state
        .aggregator
        .aggregate(&user_id, &query.fetch_options())
        .await?;

    let outcome = aggregation.label();
    match aggregation {
        Aggregation::Complete(data) => Ok(Json(FarmerDataResponse {
            outcome,
            missing: Vec::new(),
            data,
        })),
        Aggregation::Partial {
            data,
            missing,
            profile_missing,
        } => Ok(Json(FarmerDataResponse {
            outcome,
            missing: describe_missing(&missing, profile_missing),
            data,
        })),
        Aggregation::Failed {
            missing,
            profile_missing,
        } => Err(AppError::AggregationIncomplete {
            missing: describe_missing(&missing, profile_missing),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let options = FarmerDataQuery::default().fetch_options();
        assert_eq!(options, FetchOptions::default());
    }

    #[test]
    fn test_require_all_maps_to_mode() {
        let query = FarmerDataQuery {
            require_all_data: Some(true),
            max_history_days: Some(14),
            include_historical_data: Some(false),
            ..Default::default()
        };
        let options = query.fetch_options();
        assert_eq!(options.mode, AggregationMode::RequireAll);
        assert_eq!(options.max_history_days, 14);
        assert!(!options.include_historical_data);
    }
}

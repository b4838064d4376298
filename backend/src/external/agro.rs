//! Agro monitoring API client
//!
//! NDVI and soil history for a field polygon registered with the
//! AgroMonitoring service.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::{DateRange, FarmerProfile, NdviReading, SoilReading};

use super::{NdviProvider, SoilProvider};
use crate::error::{AppError, AppResult};

const KELVIN_OFFSET: f64 = 273.15;

/// AgroMonitoring API client
#[derive(Clone)]
pub struct AgroClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AgroNdviItem {
    dt: i64,
    #[serde(rename = "type")]
    source: String,
    cl: Option<f64>,
    data: AgroNdviStats,
}

#[derive(Debug, Deserialize)]
struct AgroNdviStats {
    mean: f64,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AgroSoilItem {
    dt: i64,
    /// Kelvin at 10cm depth
    t10: f64,
    moisture: f64,
    /// Kelvin at surface
    t0: f64,
}

fn decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default().round_dp(dp)
}

fn unix_start(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn unix_end(date: NaiveDate) -> i64 {
    unix_start(date) + 86_399
}

impl AgroClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.agromonitoring.com/agro/1.0".to_string())
    }

    /// Create a new AgroClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    fn polygon_id(profile: &FarmerProfile) -> AppResult<&str> {
        profile
            .satellite_polygon_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::ExternalService("farm has no registered satellite polygon".to_string()))
    }

    async fn get_history<T: DeserializeOwned>(&self, path: &str, polygon_id: &str, window: &DateRange) -> AppResult<Vec<T>> {
        let url = format!("{}/{}", self.base_url, path);
        let query = [
            ("polyid", polygon_id.to_string()),
            ("start", unix_start(window.start).to_string()),
            ("end", unix_end(window.end).to_string()),
            ("appid", self.api_key.clone()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Agro API request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Agro API error: {} - {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse {} response: {}", path, e.without_url()))
        })
    }

    fn convert_ndvi(items: Vec<AgroNdviItem>) -> Vec<NdviReading> {
        items
            .into_iter()
            .filter_map(|item| {
                let date = DateTime::from_timestamp(item.dt, 0)?.date_naive();
                Some(NdviReading {
                    date,
                    mean: decimal(item.data.mean, 3),
                    min: item.data.min.map(|v| decimal(v, 3)),
                    max: item.data.max.map(|v| decimal(v, 3)),
                    cloud_coverage_percent: item.cl.map(|v| decimal(v, 1)),
                    source: item.source,
                })
            })
            .collect()
    }

    fn convert_soil(items: Vec<AgroSoilItem>) -> Vec<SoilReading> {
        items
            .into_iter()
            .filter_map(|item| {
                Some(SoilReading {
                    recorded_at: DateTime::from_timestamp(item.dt, 0)?,
                    moisture: decimal(item.moisture, 3),
                    surface_temp_celsius: decimal(item.t0 - KELVIN_OFFSET, 1),
                    temp_10cm_celsius: decimal(item.t10 - KELVIN_OFFSET, 1),
                })
            })
            .collect()
    }
}

#[async_trait]
impl NdviProvider for AgroClient {
    async fn ndvi_history(&self, profile: &FarmerProfile, window: &DateRange) -> AppResult<Vec<NdviReading>> {
        let polygon_id = Self::polygon_id(profile)?;
        let items: Vec<AgroNdviItem> = self.get_history("ndvi/history", polygon_id, window).await?;
        Ok(Self::convert_ndvi(items))
    }
}

#[async_trait]
impl SoilProvider for AgroClient {
    async fn soil_history(&self, profile: &FarmerProfile, window: &DateRange) -> AppResult<Vec<SoilReading>> {
        let polygon_id = Self::polygon_id(profile)?;
        let items: Vec<AgroSoilItem> = self.get_history("soil/history", polygon_id, window).await?;
        Ok(Self::convert_soil(items))
    }
}

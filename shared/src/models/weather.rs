//! Weather data models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current conditions at the farm location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub observed_at: DateTime<Utc>,
    pub temperature_celsius: Decimal,
    pub feels_like_celsius: Decimal,
    pub humidity_percent: i32,
    pub pressure_hpa: i32,
    pub wind_speed_mps: Decimal,
    pub cloud_coverage_percent: i32,
    pub conditions: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_1h_mm: Option<Decimal>,
}

impl WeatherSnapshot {
    pub fn is_raining(&self) -> bool {
        self.rain_1h_mm.map(|r| r > Decimal::ZERO).unwrap_or(false)
    }
}

/// A single forecast step (OpenWeatherMap returns 3-hour steps)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature_celsius: Decimal,
    pub temp_min_celsius: Decimal,
    pub temp_max_celsius: Decimal,
    pub humidity_percent: i32,
    /// Probability of precipitation (0-1)
    pub precipitation_probability: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_3h_mm: Option<Decimal>,
    pub conditions: String,
}

impl ForecastEntry {
    /// Rain is expected when the step carries measurable rain or pop >= 0.5
    pub fn expects_rain(&self, threshold_mm: Decimal) -> bool {
        self.rain_3h_mm.map(|r| r >= threshold_mm).unwrap_or(false)
            || self.precipitation_probability >= Decimal::new(5, 1)
    }
}

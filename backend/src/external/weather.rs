//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap API for current conditions, forecasts and
//! the UV index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::{ForecastEntry, GpsCoordinates, WeatherSnapshot};

use super::{ForecastProvider, UvProvider, WeatherProvider};
use crate::error::{AppError, AppResult};

/// OpenWeatherMap forecast steps are 3 hours apart
const FORECAST_STEPS_PER_DAY: u32 = 8;

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    weather: Vec<OWMWeather>,
    main: OWMMain,
    wind: OWMWind,
    clouds: OWMClouds,
    rain: Option<OWMRain>,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: i32,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct OWMWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OWMClouds {
    all: i32,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    weather: Vec<OWMWeather>,
    pop: f64,
    rain: Option<OWMForecastRain>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastRain {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

/// OpenWeatherMap API response for UV index
#[derive(Debug, Deserialize)]
struct OWMUvResponse {
    value: f64,
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default().round_dp(2)
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.openweathermap.org/data/2.5".to_string())
    }

    /// Create a new WeatherClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        location: &GpsCoordinates,
        extra: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut query = vec![
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("appid", self.api_key.clone()),
        ];
        query.extend(extra.iter().map(|(k, v)| (*k, v.clone())));

        // Errors carry the request URL, which includes the key
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Weather API request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse {} response: {}", path, e.without_url()))
        })
    }

    /// Convert OpenWeatherMap current response to our format
    fn convert_current_response(data: OWMCurrentResponse) -> WeatherSnapshot {
        let weather = data.weather.first();

        WeatherSnapshot {
            observed_at: DateTime::from_timestamp(data.dt, 0).unwrap_or_else(Utc::now),
            temperature_celsius: decimal(data.main.temp),
            feels_like_celsius: decimal(data.main.feels_like),
            humidity_percent: data.main.humidity,
            pressure_hpa: data.main.pressure,
            wind_speed_mps: decimal(data.wind.speed),
            cloud_coverage_percent: data.clouds.all,
            conditions: weather.map(|w| w.main.clone()).unwrap_or_default(),
            description: weather.map(|w| w.description.clone()).unwrap_or_default(),
            rain_1h_mm: data.rain.and_then(|r| r.one_hour).map(decimal),
        }
    }

    /// Convert OpenWeatherMap forecast response to our format
    fn convert_forecast_response(data: OWMForecastResponse, horizon_days: u32) -> Vec<ForecastEntry> {
        data.list
            .into_iter()
            .take((horizon_days * FORECAST_STEPS_PER_DAY) as usize)
            .map(|item| ForecastEntry {
                timestamp: DateTime::from_timestamp(item.dt, 0).unwrap_or_else(Utc::now),
                temperature_celsius: decimal(item.main.temp),
                temp_min_celsius: decimal(item.main.temp_min),
                temp_max_celsius: decimal(item.main.temp_max),
                humidity_percent: item.main.humidity,
                precipitation_probability: decimal(item.pop),
                rain_3h_mm: item.rain.and_then(|r| r.three_hour).map(decimal),
                conditions: item
                    .weather
                    .first()
                    .map(|w| w.main.clone())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn current_weather(&self, location: &GpsCoordinates) -> AppResult<WeatherSnapshot> {
        let data: OWMCurrentResponse = self.get_json("weather", location, &[("units", "metric".to_string())]).await?;
        Ok(Self::convert_current_response(data))
    }
}

#[async_trait]
impl ForecastProvider for WeatherClient {
    async fn forecast(&self, location: &GpsCoordinates, horizon_days: u32) -> AppResult<Vec<ForecastEntry>> {
        let params = [
            ("units", "metric".to_string()),
            ("cnt", (horizon_days * FORECAST_STEPS_PER_DAY).to_string()),
        ];
        let data: OWMForecastResponse = self.get_json("forecast", location, &params).await?;
        Ok(Self::convert_forecast_response(data, horizon_days))
    }
}

#[async_trait]
impl UvProvider for WeatherClient {
    async fn uv_index(&self, location: &GpsCoordinates) -> AppResult<Decimal> {
        let data: OWMUvResponse = self.get_json("uvi", location, &[]).await?;
        Ok(decimal(data.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_current_response() {
        let raw = r#"{
            "weather": [{"main": "Rain", "description": "light rain"}],
            "main": {"temp": 27.4, "feels_like": 30.1, "temp_min": 26.0, "temp_max": 28.2, "pressure": 1008, "humidity": 88},
            "wind": {"speed": 3.6},
            "clouds": {"all": 75},
            "rain": {"1h": 1.2},
            "dt": 1719835200
        }"#;
        let data: OWMCurrentResponse = serde_json::from_str(raw).unwrap();
        let snapshot = WeatherClient::convert_current_response(data);

        assert_eq!(snapshot.temperature_celsius, Decimal::new(274, 1));
        assert_eq!(snapshot.humidity_percent, 88);
        assert_eq!(snapshot.conditions, "Rain");
        assert_eq!(snapshot.rain_1h_mm, Some(Decimal::new(12, 1)));
        assert!(snapshot.is_raining());
    }

    #[test]
    fn test_forecast_respects_horizon() {
        let item = r#"{"dt": 1719835200, "main": {"temp": 25.0, "feels_like": 25.0, "temp_min": 24.0, "temp_max": 26.0, "pressure": 1010, "humidity": 70}, "weather": [{"main": "Clouds", "description": "overcast"}], "pop": 0.2}"#;
        let list = vec![item; 20].join(",");
        let data: OWMForecastResponse = serde_json::from_str(&format!(r#"{{"list": [{}]}}"#, list)).unwrap();

        let entries = WeatherClient::convert_forecast_response(data, 1);
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[0].precipitation_probability, Decimal::new(2, 1));
        assert!(entries[0].rain_3h_mm.is_none());
    }
}

//! External API integrations
//!
//! Each upstream source sits behind its own trait so the aggregator can fan
//! out over them independently and tests can substitute fakes.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    DateRange, FarmerProfile, ForecastEntry, GpsCoordinates, NdviReading, SoilReading,
    WeatherSnapshot,
};

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub mod agro;
pub mod satellite;
pub mod weather;

pub use agro::AgroClient;
pub use satellite::MockSatelliteProvider;
pub use weather::WeatherClient;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, location: &GpsCoordinates) -> AppResult<WeatherSnapshot>;
}

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn forecast(&self, location: &GpsCoordinates, horizon_days: u32) -> AppResult<Vec<ForecastEntry>>;
}

#[async_trait]
pub trait UvProvider: Send + Sync {
    async fn uv_index(&self, location: &GpsCoordinates) -> AppResult<Decimal>;
}

#[async_trait]
pub trait NdviProvider: Send + Sync {
    async fn ndvi_history(&self, profile: &FarmerProfile, window: &DateRange) -> AppResult<Vec<NdviReading>>;
}

#[async_trait]
pub trait SoilProvider: Send + Sync {
    async fn soil_history(&self, profile: &FarmerProfile, window: &DateRange) -> AppResult<Vec<SoilReading>>;
}

/// The full set of upstream sources used by the aggregator
#[derive(Clone)]
pub struct DataProviders {
    pub weather: Arc<dyn WeatherProvider>,
    pub forecast: Arc<dyn ForecastProvider>,
    pub uv: Arc<dyn UvProvider>,
    pub ndvi: Arc<dyn NdviProvider>,
    pub soil: Arc<dyn SoilProvider>,
}

impl DataProviders {
    /// Wire real clients where keys are configured. Without a weather key
    /// the weather sources report a configuration error on every call;
    /// without a satellite key NDVI comes from the mock provider and soil
    /// is unavailable.
    pub fn from_config(config: &Config) -> Self {
        let (weather, forecast, uv): (
            Arc<dyn WeatherProvider>,
            Arc<dyn ForecastProvider>,
            Arc<dyn UvProvider>,
        ) = match &config.weather.api_key {
            Some(key) if !key.is_empty() => {
                let client = Arc::new(WeatherClient::with_base_url(
                    key.clone(),
                    config.weather.api_endpoint.clone(),
                ));
                (client.clone(), client.clone(), client)
            }
            _ => {
                tracing::warn!("Weather API key not configured; weather, forecast and UV disabled");
                let missing = Arc::new(Unconfigured("weather API key"));
                (missing.clone(), missing.clone(), missing)
            }
        };

        let (ndvi, soil): (Arc<dyn NdviProvider>, Arc<dyn SoilProvider>) = match &config.satellite.api_key {
            Some(key) if !key.is_empty() => {
                let client = Arc::new(AgroClient::with_base_url(
                    key.clone(),
                    config.satellite.api_endpoint.clone(),
                ));
                (client.clone(), client)
            }
            _ => {
                tracing::warn!("Satellite API key not configured; using mock NDVI data");
                (
                    Arc::new(MockSatelliteProvider::new(config.satellite.mock_latency_ms)),
                    Arc::new(Unconfigured("satellite API key")),
                )
            }
        };

        Self {
            weather,
            forecast,
            uv,
            ndvi,
            soil,
        }
    }
}

/// Stand-in for a provider whose credentials are missing
pub struct Unconfigured(pub &'static str);

impl Unconfigured {
    fn error(&self) -> AppError {
        AppError::Configuration(format!("{} not configured", self.0))
    }
}

#[async_trait]
impl WeatherProvider for Unconfigured {
    async fn current_weather(&self, _location: &GpsCoordinates) -> AppResult<WeatherSnapshot> {
        Err(self.error())
    }
}

#[async_trait]
impl ForecastProvider for Unconfigured {
    async fn forecast(&self, _location: &GpsCoordinates, _horizon_days: u32) -> AppResult<Vec<ForecastEntry>> {
        Err(self.error())
    }
}

#[async_trait]
impl UvProvider for Unconfigured {
    async fn uv_index(&self, _location: &GpsCoordinates) -> AppResult<Decimal> {
        Err(self.error())
    }
}

#[async_trait]
impl NdviProvider for Unconfigured {
    async fn ndvi_history(&self, _profile: &FarmerProfile, _window: &DateRange) -> AppResult<Vec<NdviReading>> {
        Err(self.error())
    }
}

#[async_trait]
impl SoilProvider for Unconfigured {
    async fn soil_history(&self, _profile: &FarmerProfile, _window: &DateRange) -> AppResult<Vec<SoilReading>> {
        Err(self.error())
    }
}

//! Fakes shared by the backend integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use chrono::{NaiveDate, Utc};
use farm_insights_backend::config::{AggregatorConfig, Config};
use farm_insights_backend::error::{AppError, AppResult};
use farm_insights_backend::external::{
    DataProviders, ForecastProvider, NdviProvider, SoilProvider, UvProvider, WeatherProvider,
};
use farm_insights_backend::services::{InMemoryProfileRepository, ProfileRepository};
use farm_insights_backend::{create_app, AppState};
use rust_decimal::Decimal;
use shared::{
    DataSource, DateRange, FarmerProfile, ForecastEntry, GpsCoordinates, NdviReading, SoilReading,
    WeatherSnapshot,
};
use uuid::Uuid;

pub const TEST_TIMEOUT_MS: u64 = 200;

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        aggregator: AggregatorConfig {
            source_timeout_ms: TEST_TIMEOUT_MS,
            ..AggregatorConfig::default()
        },
        ..Config::default()
    }
}

/// Canned upstream responses. `None` makes the source fail.
#[derive(Default)]
pub struct FakeSources {
    pub weather: Option<WeatherSnapshot>,
    pub uv: Option<Decimal>,
    pub ndvi: Option<Vec<NdviReading>>,
    pub soil: Option<Vec<SoilReading>>,
    pub forecast: Option<Vec<ForecastEntry>>,
    pub slow: Option<(DataSource, Duration)>,
    pub windows: Mutex<Vec<DateRange>>,
    pub horizons: Mutex<Vec<u32>>,
}

impl FakeSources {
    /// Every source answers with data
    pub fn healthy() -> Self {
        Self {
            weather: Some(weather()),
            uv: Some(Decimal::new(32, 1)),
            ndvi: Some(ndvi_series(5)),
            soil: Some(soil_series(3)),
            forecast: Some(forecast_series(4)),
            ..Self::default()
        }
    }

    pub fn into_providers(self) -> (Arc<FakeSources>, DataProviders) {
        let fake = Arc::new(self);
        let providers = DataProviders {
            weather: fake.clone(),
            forecast: fake.clone(),
            uv: fake.clone(),
            ndvi: fake.clone(),
            soil: fake.clone(),
        };
        (fake, providers)
    }

    async fn delay(&self, source: DataSource) {
        if let Some((slow, duration)) = self.slow {
            if slow == source {
                tokio::time::sleep(duration).await;
            }
        }
    }

    fn answer<T: Clone>(value: &Option<T>, source: DataSource) -> AppResult<T> {
        value
            .clone()
            .ok_or_else(|| AppError::ExternalService(format!("{} upstream unavailable", source)))
    }
}

#[async_trait]
impl WeatherProvider for FakeSources {
    async fn current_weather(&self, _location: &GpsCoordinates) -> AppResult<WeatherSnapshot> {
        self.delay(DataSource::Weather).await;
        Self::answer(&self.weather, DataSource::Weather)
    }
}

#[async_trait]
impl ForecastProvider for FakeSources {
    async fn forecast(&self, _location: &GpsCoordinates, horizon_days: u32) -> AppResult<Vec<ForecastEntry>> {
        self.horizons.lock().unwrap().push(horizon_days);
        self.delay(DataSource::Forecast).await;
        Self::answer(&self.forecast, DataSource::Forecast)
    }
}

#[async_trait]
impl UvProvider for FakeSources {
    async fn uv_index(&self, _location: &GpsCoordinates) -> AppResult<Decimal> {
        self.delay(DataSource::Uv).await;
        Self::answer(&self.uv, DataSource::Uv)
    }
}

#[async_trait]
impl NdviProvider for FakeSources {
    async fn ndvi_history(&self, _profile: &FarmerProfile, window: &DateRange) -> AppResult<Vec<NdviReading>> {
        self.windows.lock().unwrap().push(*window);
        self.delay(DataSource::Ndvi).await;
        Self::answer(&self.ndvi, DataSource::Ndvi)
    }
}

#[async_trait]
impl SoilProvider for FakeSources {
    async fn soil_history(&self, _profile: &FarmerProfile, window: &DateRange) -> AppResult<Vec<SoilReading>> {
        self.windows.lock().unwrap().push(*window);
        self.delay(DataSource::Soil).await;
        Self::answer(&self.soil, DataSource::Soil)
    }
}

/// In-memory repository that counts lookups
#[derive(Default)]
pub struct CountingRepository {
    inner: InMemoryProfileRepository,
    pub lookups: AtomicUsize,
}

impl CountingRepository {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileRepository for CountingRepository {
    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<FarmerProfile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_user_id(user_id).await
    }

    async fn insert(&self, profile: &FarmerProfile) -> AppResult<()> {
        self.inner.insert(profile).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

pub fn weather() -> WeatherSnapshot {
    WeatherSnapshot {
        observed_at: Utc::now(),
        temperature_celsius: Decimal::new(285, 1),
        feels_like_celsius: Decimal::new(301, 1),
        humidity_percent: 64,
        pressure_hpa: 1008,
        wind_speed_mps: Decimal::new(34, 1),
        cloud_coverage_percent: 40,
        conditions: "Clouds".to_string(),
        description: "scattered clouds".to_string(),
        rain_1h_mm: None,
    }
}

/// Daily readings ending today, oldest last
pub fn ndvi_series(days: i64) -> Vec<NdviReading> {
    let today = Utc::now().date_naive();
    (0..days)
        .map(|i| NdviReading {
            date: today - chrono::Duration::days(i),
            mean: Decimal::new(60 - i, 2),
            min: None,
            max: None,
            cloud_coverage_percent: None,
            source: "fake".to_string(),
        })
        .collect()
}

pub fn soil_series(days: i64) -> Vec<SoilReading> {
    let now = Utc::now();
    (0..days)
        .map(|i| SoilReading {
            recorded_at: now - chrono::Duration::days(i),
            moisture: Decimal::new(25, 2),
            surface_temp_celsius: Decimal::from(27),
            temp_10cm_celsius: Decimal::from(24),
        })
        .collect()
}

/// Three-hourly steps starting three hours from now
pub fn forecast_series(steps: i64) -> Vec<ForecastEntry> {
    let now = Utc::now();
    (1..=steps)
        .map(|i| ForecastEntry {
            timestamp: now + chrono::Duration::hours(3 * i),
            temperature_celsius: Decimal::from(29),
            temp_min_celsius: Decimal::from(26),
            temp_max_celsius: Decimal::from(31),
            humidity_percent: 70,
            precipitation_probability: Decimal::new(2, 1),
            rain_3h_mm: None,
            conditions: "Clouds".to_string(),
        })
        .collect()
}

pub fn profile_for(user_id: &str) -> FarmerProfile {
    FarmerProfile {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        full_name: "Ravi Kumar".to_string(),
        mobile: "9876543210".to_string(),
        pincode: "560001".to_string(),
        crop_name: "Rice".to_string(),
        soil_type: "Loamy".to_string(),
        sowing_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        irrigation_method: "Drip".to_string(),
        farm_size_acres: Decimal::new(25, 1),
        location: Some(GpsCoordinates::new(Decimal::new(129716, 4), Decimal::new(775946, 4))),
        satellite_polygon_id: Some("poly-42".to_string()),
        created_at: Utc::now(),
    }
}

pub async fn repository_with(profiles: &[FarmerProfile]) -> Arc<CountingRepository> {
    let repo = Arc::new(CountingRepository::default());
    for profile in profiles {
        repo.insert(profile).await.unwrap();
    }
    repo
}

pub fn app(repo: Arc<CountingRepository>, providers: DataProviders) -> Router {
    create_app(AppState::new(test_config(), repo, providers))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

//! Farmer data aggregation
//!
//! Loads the farmer profile, then fans out to every external source at once.
//! Each source runs under its own timeout and fails on its own: in
//! best-effort mode a failed source is simply left out of the record, in
//! require-all mode any gap fails the whole call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    AggregationMode, DataSource, DateRange, FarmerData, FarmerProfile, FetchOptions, ForecastEntry,
    GpsCoordinates, NdviReading, SoilReading, SourceStatus, WeatherSnapshot,
};

use crate::config::AggregatorConfig;
use crate::error::{AppError, AppResult};
use crate::external::DataProviders;
use crate::services::profile::ProfileRepository;

/// Tagged result of one aggregation
#[derive(Debug, Clone)]
pub enum Aggregation {
    /// Profile and every source present
    Complete(FarmerData),
    /// Best-effort result with gaps
    Partial {
        data: FarmerData,
        missing: Vec<DataSource>,
        profile_missing: bool,
    },
    /// Require-all mode and something was missing
    Failed {
        missing: Vec<DataSource>,
        profile_missing: bool,
    },
}

impl Aggregation {
    pub fn label(&self) -> &'static str {
        match self {
            Aggregation::Complete(_) => "complete",
            Aggregation::Partial { .. } => "partial",
            Aggregation::Failed { .. } => "failed",
        }
    }

    /// Collapse into the record, turning a failed aggregation into an error
    pub fn into_result(self) -> AppResult<FarmerData> {
        match self {
            Aggregation::Complete(data) | Aggregation::Partial { data, .. } => Ok(data),
            Aggregation::Failed {
                missing,
                profile_missing,
            } => Err(AppError::AggregationIncomplete {
                missing: describe_missing(&missing, profile_missing),
            }),
        }
    }
}

pub fn describe_missing(missing: &[DataSource], profile_missing: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(missing.len() + 1);
    if profile_missing {
        out.push("profile".to_string());
    }
    out.extend(missing.iter().map(|s| s.to_string()));
    out
}

/// Windows derived from fetch options, already clipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub history: DateRange,
    pub forecast_days: u32,
    pub snapshot_only: bool,
}

impl FetchPlan {
    pub fn new(options: &FetchOptions, config: &AggregatorConfig, now: DateTime<Utc>) -> Self {
        let bound = options.max_history_days.clamp(1, config.max_history_days_cap.max(1));

        Self {
            history: DateRange::ending_at(now.date_naive(), config.default_history_days.clamp(1, bound)),
            forecast_days: config.forecast_days.clamp(1, bound),
            snapshot_only: !options.include_historical_data,
        }
    }

    /// Keep readings inside the window; snapshot mode keeps the latest only
    pub fn clip_ndvi(&self, mut readings: Vec<NdviReading>) -> Vec<NdviReading> {
        readings.retain(|r| self.history.contains(r.date));
        readings.sort_by(|a, b| b.date.cmp(&a.date));
        if self.snapshot_only {
            readings.truncate(1);
        }
        readings
    }

    pub fn clip_soil(&self, mut readings: Vec<SoilReading>) -> Vec<SoilReading> {
        readings.retain(|r| self.history.contains(r.recorded_at.date_naive()));
        readings.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        if self.snapshot_only {
            readings.truncate(1);
        }
        readings
    }

    pub fn clip_forecast(&self, mut entries: Vec<ForecastEntry>, now: DateTime<Utc>) -> Vec<ForecastEntry> {
        let horizon = now + chrono::Duration::days(i64::from(self.forecast_days));
        entries.retain(|e| e.timestamp <= horizon);
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        if self.snapshot_only {
            entries.truncate(1);
        }
        entries
    }
}

type SourceResult<T> = Result<T, SourceStatus>;

/// Merges profile and external sources into one [`FarmerData`] record
#[derive(Clone)]
pub struct FarmerDataAggregator {
    profiles: Arc<dyn ProfileRepository>,
    providers: DataProviders,
    config: AggregatorConfig,
}

impl FarmerDataAggregator {
    pub fn new(profiles: Arc<dyn ProfileRepository>, providers: DataProviders, config: AggregatorConfig) -> Self {
        Self {
            profiles,
            providers,
            config,
        }
    }

    fn source_timeout(&self) -> Duration {
        self.config.source_timeout()
    }

    /// Fetch the merged record for a user. Per-source failures are absorbed
    /// in best-effort mode; in require-all mode they become
    /// `AppError::AggregationIncomplete`.
    pub async fn get_farmer_data(&self, user_id: &str, options: &FetchOptions) -> AppResult<FarmerData> {
        self.aggregate(user_id, options).await?.into_result()
    }

    pub async fn aggregate(&self, user_id: &str, options: &FetchOptions) -> AppResult<Aggregation> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::validation("userId", "UserId parameter is required"));
        }

        let started = Utc::now();
        let plan = FetchPlan::new(options, &self.config, started);

        let profile = self.load_profile(user_id).await;
        let location = profile.as_ref().and_then(|p| p.location.as_ref());

        let (weather, forecast, uv, ndvi, soil) = tokio::join!(
            self.fetch_weather(location),
            self.fetch_forecast(location, plan.forecast_days),
            self.fetch_uv(location),
            self.fetch_ndvi(profile.as_ref(), &plan.history),
            self.fetch_soil(profile.as_ref(), &plan.history),
        );

        let profile_missing = profile.is_none();
        let mut data = FarmerData::new(user_id, profile, started);

        match weather {
            Ok(snapshot) => data.set_current_weather(snapshot),
            Err(status) => data.mark_unavailable(DataSource::Weather, status),
        }
        match forecast {
            Ok(entries) => data.set_forecast(plan.clip_forecast(entries, started)),
            Err(status) => data.mark_unavailable(DataSource::Forecast, status),
        }
        match uv {
            Ok(index) => data.set_uv_index(index),
            Err(status) => data.mark_unavailable(DataSource::Uv, status),
        }
        match ndvi {
            Ok(readings) => data.set_ndvi_data(plan.clip_ndvi(readings)),
            Err(status) => data.mark_unavailable(DataSource::Ndvi, status),
        }
        match soil {
            Ok(readings) => data.set_soil_data(plan.clip_soil(readings)),
            Err(status) => data.mark_unavailable(DataSource::Soil, status),
        }

        let missing = data.missing_sources();
        tracing::info!(
            user_id,
            completeness = data.data_completeness(),
            missing = ?missing,
            profile_missing,
            "Aggregated farmer data"
        );

        Ok(if missing.is_empty() && !profile_missing {
            Aggregation::Complete(data)
        } else if options.mode == AggregationMode::RequireAll {
            Aggregation::Failed {
                missing,
                profile_missing,
            }
        } else {
            Aggregation::Partial {
                data,
                missing,
                profile_missing,
            }
        })
    }

    /// Profile lookup failures are logged and treated as "no profile"
    async fn load_profile(&self, user_id: &str) -> Option<FarmerProfile> {
        match tokio::time::timeout(self.source_timeout(), self.profiles.find_by_user_id(user_id)).await {
            Ok(Ok(Some(profile))) => Some(profile),
            Ok(Ok(None)) => {
                tracing::warn!(user_id, "No farmer profile found");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(user_id, error = %e, "Farmer profile lookup failed");
                None
            }
            Err(_) => {
                tracing::warn!(user_id, "Farmer profile lookup timed out");
                None
            }
        }
    }

    /// Run one source fetch under the per-source timeout
    async fn bounded<T>(&self, source: DataSource, fetch: impl Future<Output = AppResult<T>>) -> SourceResult<T> {
        let timeout = self.source_timeout();
        match tokio::time::timeout(timeout, fetch).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(%source, error = %e, "Source fetch failed");
                Err(SourceStatus::Failed {
                    reason: failure_reason(&e).to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(%source, timeout_ms = timeout.as_millis() as u64, "Source fetch timed out");
                Err(SourceStatus::TimedOut {
                    after_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn fetch_weather(&self, location: Option<&GpsCoordinates>) -> SourceResult<WeatherSnapshot> {
        let location = location.ok_or_else(no_location)?;
        self.bounded(DataSource::Weather, self.providers.weather.current_weather(location))
            .await
    }

    async fn fetch_forecast(&self, location: Option<&GpsCoordinates>, horizon_days: u32) -> SourceResult<Vec<ForecastEntry>> {
        let location = location.ok_or_else(no_location)?;
        self.bounded(DataSource::Forecast, self.providers.forecast.forecast(location, horizon_days))
            .await
    }

    async fn fetch_uv(&self, location: Option<&GpsCoordinates>) -> SourceResult<Decimal> {
        let location = location.ok_or_else(no_location)?;
        self.bounded(DataSource::Uv, self.providers.uv.uv_index(location))
            .await
    }

    async fn fetch_ndvi(&self, profile: Option<&FarmerProfile>, window: &DateRange) -> SourceResult<Vec<NdviReading>> {
        let profile = profile.ok_or_else(no_profile)?;
        self.bounded(DataSource::Ndvi, self.providers.ndvi.ndvi_history(profile, window))
            .await
    }

    async fn fetch_soil(&self, profile: Option<&FarmerProfile>, window: &DateRange) -> SourceResult<Vec<SoilReading>> {
        let profile = profile.ok_or_else(no_profile)?;
        self.bounded(DataSource::Soil, self.providers.soil.soil_history(profile, window))
            .await
    }
}

/// Client-visible reason for a failed fetch. Upstream error text stays in
/// the logs since it can echo request URLs and credentials.
fn failure_reason(error: &AppError) -> &'static str {
    match error {
        AppError::Configuration(_) => "source not configured",
        _ => "upstream request failed",
    }
}

fn no_location() -> SourceStatus {
    SourceStatus::Failed {
        reason: "no farm location on profile".to_string(),
    }
}

fn no_profile() -> SourceStatus {
    SourceStatus::Failed {
        reason: "farmer profile unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn config() -> AggregatorConfig {
        AggregatorConfig {
            source_timeout_ms: 1000,
            default_history_days: 30,
            forecast_days: 5,
            max_history_days_cap: 365,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 20, 6, 0, 0).unwrap()
    }

    fn options(include_historical_data: bool, max_history_days: u32) -> FetchOptions {
        FetchOptions {
            include_historical_data,
            max_history_days,
            mode: AggregationMode::BestEffort,
        }
    }

    fn ndvi_on(day: u32) -> NdviReading {
        NdviReading {
            date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            mean: Decimal::new(5, 1),
            min: None,
            max: None,
            cloud_coverage_percent: None,
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_plan_clips_to_max_history_days() {
        let plan = FetchPlan::new(&options(true, 7), &config(), now());
        assert_eq!(plan.history.days(), 7);
        assert_eq!(plan.forecast_days, 5);
        assert!(!plan.snapshot_only);

        let plan = FetchPlan::new(&options(true, 3), &config(), now());
        assert_eq!(plan.forecast_days, 3);
    }

    #[test]
    fn test_plan_uses_default_when_smaller() {
        let plan = FetchPlan::new(&options(true, 90), &config(), now());
        assert_eq!(plan.history.days(), 30);
    }

    #[test]
    fn test_plan_caps_and_floors() {
        let plan = FetchPlan::new(&options(true, 0), &config(), now());
        assert_eq!(plan.history.days(), 1);

        let mut cfg = config();
        cfg.default_history_days = 1000;
        let plan = FetchPlan::new(&options(true, 5000), &cfg, now());
        assert_eq!(plan.history.days(), 365);
    }

    #[test]
    fn test_snapshot_only_keeps_latest() {
        let plan = FetchPlan::new(&options(false, 7), &config(), now());
        assert!(plan.snapshot_only);
        let clipped = plan.clip_ndvi(vec![ndvi_on(18), ndvi_on(20), ndvi_on(19)]);
        assert_eq!(clipped.len(), 1);
        assert_eq!(clipped[0].date, NaiveDate::from_ymd_opt(2024, 7, 20).unwrap());
    }

    #[test]
    fn test_clip_ndvi_drops_out_of_window() {
        let plan = FetchPlan::new(&options(true, 7), &config(), now());
        let clipped = plan.clip_ndvi(vec![ndvi_on(1), ndvi_on(13), ndvi_on(14), ndvi_on(15), ndvi_on(20)]);
        let days: Vec<_> = clipped.iter().map(|r| r.date).collect();
        // Seven days ending 07-20 starts on 07-14
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(),
                NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 7, 14).unwrap(),
            ]
        );
    }

    #[test]
    fn test_failure_reason_hides_upstream_detail() {
        let upstream = AppError::ExternalService("request to https://api.example.com/weather?appid=secret-key failed".into());
        assert_eq!(failure_reason(&upstream), "upstream request failed");
        assert_eq!(
            failure_reason(&AppError::Configuration("OpenWeatherMap API key is not set".into())),
            "source not configured"
        );
    }

    #[test]
    fn test_clip_forecast_respects_horizon() {
        let plan = FetchPlan::new(&options(true, 2), &config(), now());
        let entries = (0..40)
            .map(|i| ForecastEntry {
                timestamp: now() + Duration::hours(3 * i),
                temperature_celsius: Decimal::from(30),
                temp_min_celsius: Decimal::from(28),
                temp_max_celsius: Decimal::from(32),
                humidity_percent: 50,
                precipitation_probability: Decimal::ZERO,
                rain_3h_mm: None,
                conditions: "Clear".to_string(),
            })
            .rev()
            .collect();
        let clipped = plan.clip_forecast(entries, now());
        // 0h through 48h inclusive in 3h steps
        assert_eq!(clipped.len(), 17);
        assert_eq!(clipped[0].timestamp, now());
    }

    #[test]
    fn test_describe_missing() {
        assert_eq!(
            describe_missing(&[DataSource::Soil, DataSource::Uv], true),
            vec!["profile", "soil", "uv"]
        );
    }
}

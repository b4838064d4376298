//! Aggregated per-farmer data record

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{FarmerProfile, ForecastEntry, NdviReading, SoilReading, WeatherSnapshot};

/// External sources merged into a [`FarmerData`] record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Weather,
    Ndvi,
    Soil,
    Uv,
    Forecast,
}

impl DataSource {
    pub const ALL: [DataSource; 5] = [
        DataSource::Weather,
        DataSource::Ndvi,
        DataSource::Soil,
        DataSource::Uv,
        DataSource::Forecast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Weather => "weather",
            DataSource::Ndvi => "ndvi",
            DataSource::Soil => "soil",
            DataSource::Uv => "uv",
            DataSource::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of fetching one source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Available,
    /// The provider answered but had nothing for the window
    Empty,
    Failed { reason: String },
    TimedOut { after_ms: u64 },
}

impl SourceStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, SourceStatus::Available)
    }
}

/// Policy applied when a source is missing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Return whatever arrived
    #[default]
    BestEffort,
    /// Fail the whole call if anything is missing
    RequireAll,
}

impl AggregationMode {
    pub fn from_require_all(require_all_data: bool) -> Self {
        if require_all_data {
            AggregationMode::RequireAll
        } else {
            AggregationMode::BestEffort
        }
    }
}

/// Options controlling a single aggregation call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FetchOptions {
    /// Fetch time series rather than the latest snapshot only
    pub include_historical_data: bool,
    /// Upper bound on any lookback or lookahead window
    pub max_history_days: u32,
    pub mode: AggregationMode,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            include_historical_data: true,
            max_history_days: 30,
            mode: AggregationMode::BestEffort,
        }
    }
}

/// Completeness as a whole percentage of expected sources present
pub fn completeness_percent(available: usize, expected: usize) -> u8 {
    if expected == 0 {
        return 0;
    }
    let available = available.min(expected);
    ((available * 100 + expected / 2) / expected) as u8
}

/// Everything known about one farmer, merged from all sources.
///
/// Source data is only changed through the setters so that `sources` and
/// `data_completeness` always describe the data actually held.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmerData {
    user_id: String,
    profile: Option<FarmerProfile>,
    current_weather: Option<WeatherSnapshot>,
    /// Most recent first
    ndvi_data: Vec<NdviReading>,
    /// Most recent first
    soil_data: Vec<SoilReading>,
    uv_index: Option<Decimal>,
    /// Soonest first
    forecast: Vec<ForecastEntry>,
    sources: BTreeMap<DataSource, SourceStatus>,
    data_completeness: u8,
    last_updated: DateTime<Utc>,
}

impl FarmerData {
    /// A record with no source data: completeness 0, every source failed
    /// until told otherwise.
    pub fn new(user_id: impl Into<String>, profile: Option<FarmerProfile>, last_updated: DateTime<Utc>) -> Self {
        let sources = DataSource::ALL
            .iter()
            .map(|s| {
                (
                    *s,
                    SourceStatus::Failed {
                        reason: "not fetched".to_string(),
                    },
                )
            })
            .collect();

        Self {
            user_id: user_id.into(),
            profile,
            current_weather: None,
            ndvi_data: Vec::new(),
            soil_data: Vec::new(),
            uv_index: None,
            forecast: Vec::new(),
            sources,
            data_completeness: 0,
            last_updated,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn profile(&self) -> Option<&FarmerProfile> {
        self.profile.as_ref()
    }

    pub fn current_weather(&self) -> Option<&WeatherSnapshot> {
        self.current_weather.as_ref()
    }

    pub fn ndvi_data(&self) -> &[NdviReading] {
        &self.ndvi_data
    }

    pub fn soil_data(&self) -> &[SoilReading] {
        &self.soil_data
    }

    pub fn uv_index(&self) -> Option<Decimal> {
        self.uv_index
    }

    pub fn forecast(&self) -> &[ForecastEntry] {
        &self.forecast
    }

    pub fn sources(&self) -> &BTreeMap<DataSource, SourceStatus> {
        &self.sources
    }

    pub fn data_completeness(&self) -> u8 {
        self.data_completeness
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn set_current_weather(&mut self, weather: WeatherSnapshot) {
        self.current_weather = Some(weather);
        self.sources.insert(DataSource::Weather, SourceStatus::Available);
        self.refresh_completeness();
    }

    pub fn set_uv_index(&mut self, uv_index: Decimal) {
        self.uv_index = Some(uv_index);
        self.sources.insert(DataSource::Uv, SourceStatus::Available);
        self.refresh_completeness();
    }

    /// Stores NDVI readings, newest first
    pub fn set_ndvi_data(&mut self, mut readings: Vec<NdviReading>) {
        readings.sort_by(|a, b| b.date.cmp(&a.date));
        self.sources.insert(DataSource::Ndvi, sequence_status(&readings));
        self.ndvi_data = readings;
        self.refresh_completeness();
    }

    /// Stores soil readings, newest first
    pub fn set_soil_data(&mut self, mut readings: Vec<SoilReading>) {
        readings.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        self.sources.insert(DataSource::Soil, sequence_status(&readings));
        self.soil_data = readings;
        self.refresh_completeness();
    }

    /// Stores forecast steps, soonest first
    pub fn set_forecast(&mut self, mut entries: Vec<ForecastEntry>) {
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        self.sources.insert(DataSource::Forecast, sequence_status(&entries));
        self.forecast = entries;
        self.refresh_completeness();
    }

    /// Drops any data held for `source` and records why it is missing
    pub fn mark_unavailable(&mut self, source: DataSource, status: SourceStatus) {
        match source {
            DataSource::Weather => self.current_weather = None,
            DataSource::Ndvi => self.ndvi_data.clear(),
            DataSource::Soil => self.soil_data.clear(),
            DataSource::Uv => self.uv_index = None,
            DataSource::Forecast => self.forecast.clear(),
        }
        let status = if status.is_available() {
            SourceStatus::Empty
        } else {
            status
        };
        self.sources.insert(source, status);
        self.refresh_completeness();
    }

    /// Whether `source` contributed data. Sequences count only when non-empty.
    pub fn has(&self, source: DataSource) -> bool {
        match source {
            DataSource::Weather => self.current_weather.is_some(),
            DataSource::Ndvi => !self.ndvi_data.is_empty(),
            DataSource::Soil => !self.soil_data.is_empty(),
            DataSource::Uv => self.uv_index.is_some(),
            DataSource::Forecast => !self.forecast.is_empty(),
        }
    }

    pub fn available_sources(&self) -> Vec<DataSource> {
        DataSource::ALL.into_iter().filter(|s| self.has(*s)).collect()
    }

    pub fn missing_sources(&self) -> Vec<DataSource> {
        DataSource::ALL.into_iter().filter(|s| !self.has(*s)).collect()
    }

    fn refresh_completeness(&mut self) {
        self.data_completeness =
            completeness_percent(self.available_sources().len(), DataSource::ALL.len());
    }
}

fn sequence_status<T>(items: &[T]) -> SourceStatus {
    if items.is_empty() {
        SourceStatus::Empty
    } else {
        SourceStatus::Available
    }
}

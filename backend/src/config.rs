//! Configuration management for the Farm Insights Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FARM_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Weather API configuration (current, forecast, UV)
    pub weather: WeatherConfig,

    /// Satellite imagery and soil API configuration
    pub satellite: SatelliteConfig,

    /// Aggregation behaviour
    pub aggregator: AggregatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; profiles are kept in memory when unset
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SatelliteConfig {
    /// Agro monitoring API endpoint (NDVI and soil history)
    pub api_endpoint: String,

    /// Agro monitoring API key; NDVI falls back to mock data when unset
    pub api_key: Option<String>,

    /// Simulated latency of the mock satellite provider
    pub mock_latency_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregatorConfig {
    /// Upper bound on each individual source fetch
    pub source_timeout_ms: u64,

    /// History window requested from providers before clipping
    pub default_history_days: u32,

    /// Forecast horizon requested before clipping
    pub forecast_days: u32,

    /// Hard cap on any caller-supplied maxHistoryDays
    pub max_history_days_cap: u32,
}

impl AggregatorConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FARM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("satellite.api_endpoint", "https://api.agromonitoring.com/agro/1.0")?
            .set_default("satellite.mock_latency_ms", 300)?
            .set_default("aggregator.source_timeout_ms", 5000)?
            .set_default("aggregator.default_history_days", 30)?
            .set_default("aggregator.forecast_days", 5)?
            .set_default("aggregator.max_history_days_cap", 365)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FARM_ prefix)
            .add_source(
                Environment::with_prefix("FARM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: None,
        }
    }
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.agromonitoring.com/agro/1.0".to_string(),
            api_key: None,
            mock_latency_ms: 300,
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            source_timeout_ms: 5000,
            default_history_days: 30,
            forecast_days: 5,
            max_history_days_cap: 365,
        }
    }
}

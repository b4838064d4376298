//! Satellite and soil observations for a farm field

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One NDVI observation aggregated over the field polygon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NdviReading {
    pub date: NaiveDate,
    /// Mean NDVI over the field (-1 to 1)
    pub mean: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_coverage_percent: Option<Decimal>,
    pub source: String,
}

/// Vegetation health band derived from mean NDVI
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VegetationHealth {
    Bare,
    Sparse,
    Moderate,
    Healthy,
}

impl NdviReading {
    pub fn health(&self) -> VegetationHealth {
        if self.mean < Decimal::new(2, 1) {
            VegetationHealth::Bare
        } else if self.mean < Decimal::new(4, 1) {
            VegetationHealth::Sparse
        } else if self.mean < Decimal::new(6, 1) {
            VegetationHealth::Moderate
        } else {
            VegetationHealth::Healthy
        }
    }
}

/// Soil moisture and temperature sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SoilReading {
    pub recorded_at: DateTime<Utc>,
    /// Volumetric moisture (m3/m3)
    pub moisture: Decimal,
    pub surface_temp_celsius: Decimal,
    pub temp_10cm_celsius: Decimal,
}

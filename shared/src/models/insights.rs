//! Agronomic insight models attached to a new profile

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Growth stage estimated from days since sowing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CropStage {
    Germination,
    Vegetative,
    Flowering,
    Maturity,
    ReadyForHarvest,
}

impl std::fmt::Display for CropStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropStage::Germination => write!(f, "Germination"),
            CropStage::Vegetative => write!(f, "Vegetative"),
            CropStage::Flowering => write!(f, "Flowering"),
            CropStage::Maturity => write!(f, "Maturity"),
            CropStage::ReadyForHarvest => write!(f, "Ready for harvest"),
        }
    }
}

/// Typical season length in days for common crops
pub fn crop_duration_days(crop_name: &str) -> i64 {
    match crop_name.trim().to_ascii_lowercase().as_str() {
        "rice" | "paddy" => 120,
        "wheat" => 125,
        "maize" | "corn" => 100,
        "cotton" => 165,
        "sugarcane" => 365,
        "soybean" | "soyabean" => 100,
        "groundnut" | "peanut" => 110,
        "chickpea" | "gram" => 105,
        "mustard" => 115,
        "tomato" => 90,
        "onion" => 130,
        "potato" => 100,
        _ => 120,
    }
}

/// Map elapsed days onto a crop stage
pub fn crop_stage(days_since_sowing: i64, season_days: i64) -> CropStage {
    let season_days = season_days.max(1);
    let progress = days_since_sowing.max(0) * 100 / season_days;
    match progress {
        0..=9 => CropStage::Germination,
        10..=44 => CropStage::Vegetative,
        45..=69 => CropStage::Flowering,
        70..=99 => CropStage::Maturity,
        _ => CropStage::ReadyForHarvest,
    }
}

/// Rule-based insights returned with a newly created profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiInsights {
    pub crop_stage: CropStage,
    pub days_since_sowing: i64,
    pub expected_harvest_date: NaiveDate,
    pub irrigation_advice: String,
    #[serde(default)]
    pub weather_advisories: Vec<String>,
}

//! Rule-based agronomic insights for a new profile

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use shared::{crop_duration_days, crop_stage, AiInsights, CropStage, FarmerProfile, WeatherSnapshot};

/// Heat stress above 35°C
const HEAT_STRESS_CELSIUS: i64 = 35;
/// Frost risk below 4°C
const FROST_RISK_CELSIUS: i64 = 4;
/// Strong wind above 10 m/s
const STRONG_WIND_MPS: i64 = 10;
/// Fungal disease pressure above 85% humidity
const HIGH_HUMIDITY_PERCENT: i32 = 85;

pub fn generate(profile: &FarmerProfile, weather: Option<&WeatherSnapshot>, today: NaiveDate) -> AiInsights {
    let season_days = crop_duration_days(&profile.crop_name);
    let days_since_sowing = (today - profile.sowing_date).num_days().max(0);

    AiInsights {
        crop_stage: crop_stage(days_since_sowing, season_days),
        days_since_sowing,
        expected_harvest_date: profile.sowing_date + Duration::days(season_days),
        irrigation_advice: irrigation_advice(&profile.irrigation_method, weather),
        weather_advisories: weather.map(weather_advisories).unwrap_or_default(),
    }
}

fn irrigation_advice(method: &str, weather: Option<&WeatherSnapshot>) -> String {
    if let Some(w) = weather {
        if w.is_raining() || w.humidity_percent > HIGH_HUMIDITY_PERCENT {
            return "Skip irrigation today: rain or very humid conditions at the farm".to_string();
        }
        if w.temperature_celsius > Decimal::from(HEAT_STRESS_CELSIUS) {
            return "Irrigate in the early morning or evening to limit evaporation losses".to_string();
        }
    }

    match method.trim().to_ascii_lowercase().as_str() {
        "drip" => "Run drip lines in short daily cycles and check emitters for clogging",
        "sprinkler" => "Sprinkle in the early morning when wind is low",
        "flood" | "basin" => "Maintain a shallow water level and drain before fertilizer application",
        "furrow" => "Irrigate alternate furrows to save water",
        "rainfed" | "none" => "Monitor soil moisture; plan protective irrigation for dry spells",
        _ => "Irrigate when the top 5 cm of soil is dry",
    }
    .to_string()
}

fn weather_advisories(w: &WeatherSnapshot) -> Vec<String> {
    let mut advisories = Vec::new();
    if w.temperature_celsius > Decimal::from(HEAT_STRESS_CELSIUS) {
        advisories.push(format!("Heat stress risk at {}°C", w.temperature_celsius));
    }
    if w.temperature_celsius < Decimal::from(FROST_RISK_CELSIUS) {
        advisories.push(format!("Frost risk at {}°C", w.temperature_celsius));
    }
    if w.wind_speed_mps > Decimal::from(STRONG_WIND_MPS) {
        advisories.push("Strong wind: postpone spraying".to_string());
    }
    if w.humidity_percent > HIGH_HUMIDITY_PERCENT {
        advisories.push("High humidity: watch for fungal disease".to_string());
    }
    advisories
}

pub fn recommendations(profile: &FarmerProfile, insights: &AiInsights) -> Vec<String> {
    let mut out = vec![match insights.crop_stage {
        CropStage::Germination => format!("Ensure even moisture for {} seedlings to establish", profile.crop_name),
        CropStage::Vegetative => "Apply nitrogen top dressing and keep fields weed free".to_string(),
        CropStage::Flowering => "Avoid water stress during flowering; scout for pests".to_string(),
        CropStage::Maturity => "Reduce irrigation as grains or fruits mature".to_string(),
        CropStage::ReadyForHarvest => "Plan harvest and arrange storage".to_string(),
    }];

    if profile.satellite_polygon_id.is_none() {
        out.push("Register your field boundary to receive satellite crop health updates".to_string());
    }
    if profile.location.is_none() {
        out.push("Share your farm location to receive local weather alerts".to_string());
    }
    out
}

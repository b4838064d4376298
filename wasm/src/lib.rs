//! WebAssembly module for the Farm Insights Platform
//!
//! Provides client-side support for:
//! - Finishing onboarding (localStorage, alert, dashboard navigation)
//! - Mock satellite NDVI trends for the dashboard
//! - Offline validation of contact details

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use shared::onboarding::{complete_onboarding, ClientStorage, OnboardingUi, SubmissionOutcome};
use shared::satellite::{mock_ndvi_series, seed_for};

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// `window.localStorage`
struct LocalStorage(web_sys::Storage);

fn storage_error(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| "storage unavailable".to_string())
}

impl ClientStorage for LocalStorage {
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.0.set_item(key, value).map_err(storage_error)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), String> {
        self.0.remove_item(key).map_err(storage_error)
    }
}

struct BrowserUi(web_sys::Window);

impl OnboardingUi for BrowserUi {
    fn alert(&mut self, message: &str) {
        if self.0.alert_with_message(message).is_err() {
            web_sys::console::warn_1(&JsValue::from_str(message));
        }
    }

    fn navigate(&mut self, path: &str) {
        if let Err(e) = self.0.location().set_href(path) {
            web_sys::console::error_1(&e);
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Interpret the HTTP result of the profile POST. A status of 0 means the
/// request never reached the server.
fn outcome_from_http(status: u16, body: &str) -> SubmissionOutcome {
    if status == 0 {
        return SubmissionOutcome::NetworkError(body.to_string());
    }
    if (200..300).contains(&status) {
        return match serde_json::from_str(body) {
            Ok(response) => SubmissionOutcome::Accepted(response),
            Err(_) => SubmissionOutcome::Rejected {
                status,
                error: Some("Unexpected response from server".to_string()),
            },
        };
    }
    SubmissionOutcome::Rejected {
        status,
        error: serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| b.error),
    }
}

/// Complete onboarding after the profile POST. Returns true when the
/// profile was stored and the browser is moving to the dashboard; false
/// when the farmer has been alerted and should stay on the form.
#[wasm_bindgen]
pub fn finish_onboarding(submission_json: &str, status: u16, response_body: &str) -> Result<bool, JsValue> {
    let submission: ProfileSubmission = serde_json::from_str(submission_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid submission JSON: {}", e)))?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
    let storage = window
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))?;

    let result = complete_onboarding(
        &submission,
        outcome_from_http(status, response_body),
        &mut LocalStorage(storage),
        &mut BrowserUi(window),
    );
    Ok(result.is_ok())
}

fn today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
}

/// Longest trend the dashboard can request
const MAX_TREND_DAYS: u32 = 365;

fn ndvi_trend_json(field_id: &str, days: u32, end: NaiveDate) -> Result<String, serde_json::Error> {
    let days = days.min(MAX_TREND_DAYS);
    serde_json::to_string(&mock_ndvi_series(seed_for(field_id), days, end))
}

/// Mock NDVI trend for a field: `days` daily readings ending today (at most
/// a year), most recent first, as a JSON array
#[wasm_bindgen]
pub fn mock_ndvi_trend(field_id: &str, days: u32) -> Result<String, JsValue> {
    let end = today().ok_or_else(|| JsValue::from_str("Invalid system date"))?;
    ndvi_trend_json(field_id, days, end).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Vegetation health band for a mean NDVI value
#[wasm_bindgen]
pub fn vegetation_health(mean: f64) -> String {
    let reading = NdviReading {
        date: NaiveDate::default(),
        mean: Decimal::try_from(mean).unwrap_or(Decimal::ZERO),
        min: None,
        max: None,
        cloud_coverage_percent: None,
        source: String::new(),
    };
    match reading.health() {
        VegetationHealth::Bare => "Bare",
        VegetationHealth::Sparse => "Sparse",
        VegetationHealth::Moderate => "Moderate",
        VegetationHealth::Healthy => "Healthy",
    }
    .to_string()
}

/// Validate an Indian mobile number
#[wasm_bindgen]
pub fn validate_mobile_number(mobile: &str) -> bool {
    validate_indian_mobile(mobile).is_ok()
}

/// Validate a 6-digit Indian pincode
#[wasm_bindgen]
pub fn validate_pincode_format(pincode: &str) -> bool {
    validate_pincode(pincode).is_ok()
}

/// Completeness percentage for `available` of `expected` sources
#[wasm_bindgen]
pub fn data_completeness_percent(available: usize, expected: usize) -> u8 {
    completeness_percent(available, expected)
}

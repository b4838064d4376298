//! Validation utilities for the Farm Insights Platform
//!
//! Includes India-specific checks for farmer contact and address details.

use std::borrow::Cow;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::ProfileSubmission;
use crate::types::GpsCoordinates;

// ============================================================================
// General Validations
// ============================================================================

/// Validate a user identifier (non-blank, no whitespace, at most 128 chars)
pub fn validate_user_id(user_id: &str) -> Result<(), &'static str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err("User id must not be empty");
    }
    if trimmed.len() > 128 {
        return Err("User id must be at most 128 characters");
    }
    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("User id must not contain whitespace");
    }
    Ok(())
}

/// Validate latitude/longitude ranges
pub fn validate_coordinates(coords: &GpsCoordinates) -> Result<(), &'static str> {
    if coords.latitude < Decimal::from(-90) || coords.latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if coords.longitude < Decimal::from(-180) || coords.longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a field area in acres
pub fn validate_field_area(area_acres: Decimal) -> Result<(), &'static str> {
    if area_acres <= Decimal::ZERO {
        return Err("Field area must be greater than zero");
    }
    if area_acres > Decimal::from(10_000) {
        return Err("Field area must be at most 10000 acres");
    }
    Ok(())
}

/// Validate that a sowing date is not in the future
pub fn validate_sowing_date(sowing_date: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if sowing_date > today {
        return Err("Sowing date cannot be in the future");
    }
    Ok(())
}

/// Validate an NDVI value (-1 to 1)
pub fn validate_ndvi(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::NEGATIVE_ONE || value > Decimal::ONE {
        return Err("NDVI must be between -1 and 1");
    }
    Ok(())
}

// ============================================================================
// India-Specific Validations
// ============================================================================

/// Validate Indian mobile number format
/// Accepts: 9876543210, 09876543210, +91 98765 43210
pub fn validate_indian_mobile(mobile: &str) -> Result<(), &'static str> {
    let digits: String = mobile.chars().filter(|c| c.is_ascii_digit()).collect();

    let subscriber = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('0') => &digits[1..],
        12 if digits.starts_with("91") => &digits[2..],
        _ => return Err("Invalid Indian mobile number format"),
    };

    // Mobile numbers start with 6, 7, 8 or 9
    match subscriber.chars().next() {
        Some('6'..='9') => Ok(()),
        _ => Err("Indian mobile numbers must start with 6, 7, 8 or 9"),
    }
}

/// Validate Indian postal index number (6 digits, first digit 1-9)
pub fn validate_pincode(pincode: &str) -> Result<(), &'static str> {
    let trimmed = pincode.trim();
    if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err("Pincode must be 6 digits");
    }
    if trimmed.starts_with('0') {
        return Err("Pincode cannot start with 0");
    }
    Ok(())
}

// ============================================================================
// Submission schema
// ============================================================================

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub(crate) fn check_mobile(mobile: &str) -> Result<(), ValidationError> {
    validate_indian_mobile(mobile).map_err(|m| rule_error("mobile", m))
}

pub(crate) fn check_pincode(pincode: &str) -> Result<(), ValidationError> {
    validate_pincode(pincode).map_err(|m| rule_error("pincode", m))
}

pub(crate) fn check_coordinates(coords: &GpsCoordinates) -> Result<(), ValidationError> {
    validate_coordinates(coords).map_err(|m| rule_error("coordinates", m))
}

/// First problem found in a profile submission
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct SubmissionError {
    pub field: String,
    pub message: String,
}

impl SubmissionError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn first_error(errors: &ValidationErrors, prefix: &str) -> Option<SubmissionError> {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().copied().collect();
    fields.sort_unstable();

    let field = fields.first()?;
    let error = field_errors.get(field).and_then(|list| list.first())?;
    let message = error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("Invalid value ({})", error.code));
    Some(SubmissionError::new(format!("{}{}", prefix, camel_case(field)), message))
}

/// Struct field names are snake_case; the wire format is camelCase
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Validate an onboarding submission end to end, rejecting malformed
/// payloads before anything is stored.
pub fn validate_submission(submission: &ProfileSubmission, today: NaiveDate) -> Result<(), SubmissionError> {
    if let Err(errors) = submission.validate() {
        if let Some(error) = first_error(&errors, "") {
            return Err(error);
        }
    }

    validate_user_id(&submission.user_id).map_err(|m| SubmissionError::new("userId", m))?;

    if let Some(pincode_location) = &submission.pincode_location {
        if let Err(errors) = pincode_location.validate() {
            if let Some(error) = first_error(&errors, "pincodeLocation.") {
                return Err(error);
            }
        }
        if let Some(coords) = pincode_location.coordinates() {
            validate_coordinates(&coords)
                .map_err(|m| SubmissionError::new("pincodeLocation", m))?;
        }
    }

    for (index, field) in submission.farm_fields.iter().enumerate() {
        let prefix = format!("farmFields[{}].", index);
        if let Err(errors) = field.validate() {
            if let Some(error) = first_error(&errors, &prefix) {
                return Err(error);
            }
        }
        validate_field_area(field.area_acres)
            .map_err(|m| SubmissionError::new(format!("{}areaAcres", prefix), m))?;
        validate_sowing_date(field.sowing_date, today)
            .map_err(|m| SubmissionError::new(format!("{}sowingDate", prefix), m))?;
        for point in &field.boundary {
            validate_coordinates(point)
                .map_err(|m| SubmissionError::new(format!("{}boundary", prefix), m))?;
        }
    }

    Ok(())
}

//! Farmer profile and onboarding submission models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{AiInsights, WeatherSnapshot};
use crate::types::GpsCoordinates;
use crate::validation::{check_coordinates, check_mobile, check_pincode};

/// A farmer's profile, created once at the end of onboarding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmerProfile {
    pub id: Uuid,
    pub user_id: String,
    pub full_name: String,
    pub mobile: String,
    pub pincode: String,
    pub crop_name: String,
    pub soil_type: String,
    pub sowing_date: NaiveDate,
    pub irrigation_method: String,
    /// Total cultivated area in acres
    pub farm_size_acres: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GpsCoordinates>,
    /// Polygon registered with the satellite imagery provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite_polygon_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FarmerProfile {
    /// Build a profile from a validated submission. The primary field is the
    /// first one listed; farm size is the sum of all field areas.
    pub fn from_submission(submission: &ProfileSubmission, id: Uuid, now: DateTime<Utc>) -> Option<Self> {
        let primary = submission.farm_fields.first()?;
        let farm_size_acres = submission.farm_fields.iter().map(|f| f.area_acres).sum();

        Some(Self {
            id,
            user_id: submission.user_id.trim().to_string(),
            full_name: submission.full_name.trim().to_string(),
            mobile: submission.mobile.trim().to_string(),
            pincode: submission.pincode.trim().to_string(),
            crop_name: primary.crop_name.clone(),
            soil_type: primary.soil_type.clone(),
            sowing_date: primary.sowing_date,
            irrigation_method: primary.irrigation_method.clone(),
            farm_size_acres,
            location: submission.farm_location(),
            satellite_polygon_id: primary.satellite_polygon_id.clone(),
            created_at: now,
        })
    }
}

/// Location resolved from the postal code lookup on the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PincodeLocation {
    #[validate(length(max = 100))]
    pub district: String,
    #[validate(length(max = 100))]
    pub state: String,
    #[serde(default)]
    pub latitude: Option<Decimal>,
    #[serde(default)]
    pub longitude: Option<Decimal>,
}

impl PincodeLocation {
    pub fn coordinates(&self) -> Option<GpsCoordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GpsCoordinates::new(lat, lon)),
            _ => None,
        }
    }
}

/// One cultivated field drawn during onboarding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmField {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 60))]
    pub crop_name: String,
    #[validate(length(min = 1, max = 60))]
    pub soil_type: String,
    pub sowing_date: NaiveDate,
    #[validate(length(min = 1, max = 60))]
    pub irrigation_method: String,
    pub area_acres: Decimal,
    /// Field boundary polygon, in drawing order
    #[serde(default)]
    pub boundary: Vec<GpsCoordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite_polygon_id: Option<String>,
}

/// Payload posted by the onboarding flow to create a profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSubmission {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(custom = "check_mobile")]
    pub mobile: String,
    #[validate(custom = "check_pincode")]
    pub pincode: String,
    #[serde(default)]
    #[validate(custom = "check_coordinates")]
    pub location: Option<GpsCoordinates>,
    #[serde(default)]
    pub pincode_location: Option<PincodeLocation>,
    #[validate(length(min = 1, max = 20))]
    pub farm_fields: Vec<FarmField>,
}

impl ProfileSubmission {
    /// Explicit location first, then the pincode lookup, then the centroid
    /// of the first field boundary.
    pub fn farm_location(&self) -> Option<GpsCoordinates> {
        self.location
            .clone()
            .or_else(|| self.pincode_location.as_ref().and_then(|p| p.coordinates()))
            .or_else(|| {
                self.farm_fields
                    .first()
                    .and_then(|f| GpsCoordinates::centroid(&f.boundary))
            })
    }
}

/// Profile as returned to the client after creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProfile {
    #[serde(flatten)]
    pub profile: FarmerProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<AiInsights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<WeatherSnapshot>,
}

/// Response body of the profile-creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: CreatedProfile,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(mobile: &str, pincode: &str) -> ProfileSubmission {
        ProfileSubmission {
            user_id: " farmer-7 ".to_string(),
            full_name: "Meena Rao".to_string(),
            mobile: mobile.to_string(),
            pincode: pincode.to_string(),
            location: None,
            pincode_location: None,
            farm_fields: vec![
                FarmField {
                    name: "East plot".to_string(),
                    crop_name: "Cotton".to_string(),
                    soil_type: "Black".to_string(),
                    sowing_date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
                    irrigation_method: "Drip".to_string(),
                    area_acres: Decimal::new(15, 1),
                    boundary: Vec::new(),
                    satellite_polygon_id: Some("poly-7".to_string()),
                },
                FarmField {
                    name: "West plot".to_string(),
                    crop_name: "Jowar".to_string(),
                    soil_type: "Red".to_string(),
                    sowing_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                    irrigation_method: "Rainfed".to_string(),
                    area_acres: Decimal::from(2),
                    boundary: Vec::new(),
                    satellite_polygon_id: None,
                },
            ],
        }
    }

    #[test]
    fn test_from_submission_trims_contact_details() {
        let s = submission(" 9876543210\t", "  560001 ");
        assert!(s.validate().is_ok());

        let profile = FarmerProfile::from_submission(&s, Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(profile.user_id, "farmer-7");
        assert_eq!(profile.mobile, "9876543210");
        assert_eq!(profile.pincode, "560001");
    }

    #[test]
    fn test_from_submission_uses_first_field() {
        let profile = FarmerProfile::from_submission(&submission("9876543210", "560001"), Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(profile.crop_name, "Cotton");
        assert_eq!(profile.farm_size_acres, Decimal::new(35, 1));
        assert_eq!(profile.satellite_polygon_id.as_deref(), Some("poly-7"));
    }

    #[test]
    fn test_from_submission_requires_a_field() {
        let mut s = submission("9876543210", "560001");
        s.farm_fields.clear();
        assert!(FarmerProfile::from_submission(&s, Uuid::new_v4(), Utc::now()).is_none());
    }
}

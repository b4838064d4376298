//! Farmer profile storage and creation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    validate_submission, CreatedProfile, FarmerProfile, GpsCoordinates, ProfileResponse,
    ProfileSubmission,
};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::WeatherProvider;
use crate::services::insights;

/// Where profiles live between onboarding and later lookups
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<FarmerProfile>>;

    /// Insert a new profile; a second profile for the same user is a
    /// `DuplicateEntry` error.
    async fn insert(&self, profile: &FarmerProfile) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// PostgreSQL-backed profile repository
#[derive(Clone)]
pub struct PgProfileRepository {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: String,
    full_name: String,
    mobile: String,
    pincode: String,
    crop_name: String,
    soil_type: String,
    sowing_date: NaiveDate,
    irrigation_method: String,
    farm_size_acres: Decimal,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    satellite_polygon_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for FarmerProfile {
    fn from(row: ProfileRow) -> Self {
        let location = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Some(GpsCoordinates::new(lat, lon)),
            _ => None,
        };
        FarmerProfile {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            mobile: row.mobile,
            pincode: row.pincode,
            crop_name: row.crop_name,
            soil_type: row.soil_type,
            sowing_date: row.sowing_date,
            irrigation_method: row.irrigation_method,
            farm_size_acres: row.farm_size_acres,
            location,
            satellite_polygon_id: row.satellite_polygon_id,
            created_at: row.created_at,
        }
    }
}

impl PgProfileRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<FarmerProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, user_id, full_name, mobile, pincode, crop_name, soil_type,
                   sowing_date, irrigation_method, farm_size_acres, latitude, longitude,
                   satellite_polygon_id, created_at
            FROM farmer_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(FarmerProfile::from))
    }

    async fn insert(&self, profile: &FarmerProfile) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO farmer_profiles (
                id, user_id, full_name, mobile, pincode, crop_name, soil_type,
                sowing_date, irrigation_method, farm_size_acres, latitude, longitude,
                satellite_polygon_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.user_id)
        .bind(&profile.full_name)
        .bind(&profile.mobile)
        .bind(&profile.pincode)
        .bind(&profile.crop_name)
        .bind(&profile.soil_type)
        .bind(profile.sowing_date)
        .bind(&profile.irrigation_method)
        .bind(profile.farm_size_acres)
        .bind(profile.location.as_ref().map(|l| l.latitude))
        .bind(profile.location.as_ref().map(|l| l.longitude))
        .bind(&profile.satellite_polygon_id)
        .bind(profile.created_at)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::DuplicateEntry("userId".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// Process-local profile repository used when no database is configured
#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<String, FarmerProfile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<FarmerProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn insert(&self, profile: &FarmerProfile) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.user_id) {
            return Err(AppError::DuplicateEntry("userId".to_string()));
        }
        profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Profile service handling onboarding submissions
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    weather: Arc<dyn WeatherProvider>,
    weather_timeout: Duration,
}

impl ProfileService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        weather: Arc<dyn WeatherProvider>,
        weather_timeout: Duration,
    ) -> Self {
        Self {
            profiles,
            weather,
            weather_timeout,
        }
    }

    /// Validate and store a submission, then attach a weather snapshot and
    /// insights. Weather is best effort: the profile is created without it
    /// when the provider fails or is slow.
    pub async fn create_profile(&self, submission: ProfileSubmission) -> AppResult<ProfileResponse> {
        let now = Utc::now();
        let today = now.date_naive();
        validate_submission(&submission, today)?;

        let profile = FarmerProfile::from_submission(&submission, Uuid::new_v4(), now)
            .ok_or_else(|| AppError::validation("farmFields", "At least one farm field is required"))?;

        self.profiles.insert(&profile).await?;
        tracing::info!(user_id = %profile.user_id, crop = %profile.crop_name, "Created farmer profile");

        let weather_data = match &profile.location {
            Some(location) => {
                match tokio::time::timeout(self.weather_timeout, self.weather.current_weather(location)).await {
                    Ok(Ok(snapshot)) => Some(snapshot),
                    Ok(Err(e)) => {
                        tracing::warn!(user_id = %profile.user_id, error = %e, "Weather snapshot unavailable");
                        None
                    }
                    Err(_) => {
                        tracing::warn!(user_id = %profile.user_id, "Weather snapshot timed out");
                        None
                    }
                }
            }
            None => None,
        };

        let ai_insights = insights::generate(&profile, weather_data.as_ref(), today);
        let recommendations = insights::recommendations(&profile, &ai_insights);

        Ok(ProfileResponse {
            profile: CreatedProfile {
                profile,
                ai_insights: Some(ai_insights),
                weather_data,
            },
            recommendations,
        })
    }
}

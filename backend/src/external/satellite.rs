//! Mock satellite NDVI provider with simulated latency

use std::time::Duration;

use async_trait::async_trait;
use shared::satellite::{mock_ndvi_series, seed_for};
use shared::{DateRange, FarmerProfile, NdviReading};

use super::NdviProvider;
use crate::error::AppResult;

pub struct MockSatelliteProvider {
    latency: Duration,
}

impl MockSatelliteProvider {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
        }
    }
}

#[async_trait]
impl NdviProvider for MockSatelliteProvider {
    async fn ndvi_history(&self, profile: &FarmerProfile, window: &DateRange) -> AppResult<Vec<NdviReading>> {
        tokio::time::sleep(self.latency).await;
        let key = profile
            .satellite_polygon_id
            .as_deref()
            .unwrap_or(&profile.user_id);
        Ok(mock_ndvi_series(seed_for(key), window.days(), window.end))
    }
}

//! Mock satellite NDVI trend
//!
//! Used by the dashboard hook and by the server when no satellite imagery
//! provider is configured. Output is deterministic for a given seed and end
//! date so the same field always shows the same trend.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::NdviReading;

pub const MOCK_SOURCE: &str = "mock-satellite";

const NDVI_FLOOR: f64 = 0.1;
const NDVI_CEILING: f64 = 0.9;

/// Stable seed for a field or user identifier (FNV-1a)
pub fn seed_for(key: &str) -> u64 {
    key.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Linear congruential generator yielding values in [0, 1)
struct Lcg(u64);

impl Lcg {
    fn next_unit(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp(3)
}

/// `days` daily readings ending at `end`, most recent first
pub fn mock_ndvi_series(seed: u64, days: u32, end: NaiveDate) -> Vec<NdviReading> {
    let mut rng = Lcg(seed);

    (0..days)
        .map(|offset| {
            let date = end - Duration::days(i64::from(offset));
            // Seasonal greening peaks in late August (kharif season)
            let phase = (f64::from(date.ordinal()) - 150.0) / 365.0 * std::f64::consts::TAU;
            let seasonal = 0.5 + 0.25 * phase.sin();
            let noise = (rng.next_unit() - 0.5) * 0.1;
            let mean = (seasonal + noise).clamp(NDVI_FLOOR, NDVI_CEILING);
            let spread = 0.05 + rng.next_unit() * 0.1;

            NdviReading {
                date,
                mean: to_decimal(mean),
                min: Some(to_decimal((mean - spread).max(0.0))),
                max: Some(to_decimal((mean + spread).min(1.0))),
                cloud_coverage_percent: Some(to_decimal(rng.next_unit() * 40.0).round_dp(1)),
                source: MOCK_SOURCE.to_string(),
            }
        })
        .collect()
}

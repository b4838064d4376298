//! Common types used across the platform

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Arithmetic centroid of a set of boundary points
    pub fn centroid(points: &[GpsCoordinates]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let count = Decimal::from(points.len() as u64);
        let latitude: Decimal = points.iter().map(|p| p.latitude).sum();
        let longitude: Decimal = points.iter().map(|p| p.longitude).sum();
        Some(Self::new(
            (latitude / count).round_dp(6),
            (longitude / count).round_dp(6),
        ))
    }
}

/// Inclusive date range for history queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    /// A window of `days` calendar days ending at (and including) `end`.
    /// A zero-day request still covers `end` itself.
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            start: end - Duration::days(span),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered
    pub fn days(&self) -> u32 {
        ((self.end - self.start).num_days() + 1).max(0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_covers_requested_days() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let range = DateRange::ending_at(end, 7);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(range.days(), 7);
        assert!(range.contains(end));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()));
    }

    #[test]
    fn test_zero_day_range_is_single_day() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let range = DateRange::ending_at(end, 0);
        assert_eq!(range.start, end);
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn test_centroid() {
        let points = vec![
            GpsCoordinates::new(Decimal::from(10), Decimal::from(76)),
            GpsCoordinates::new(Decimal::from(12), Decimal::from(78)),
        ];
        let c = GpsCoordinates::centroid(&points).unwrap();
        assert_eq!(c.latitude, Decimal::from(11));
        assert_eq!(c.longitude, Decimal::from(77));
        assert!(GpsCoordinates::centroid(&[]).is_none());
    }
}

//! Business logic services for the Farm Insights Platform

pub mod aggregator;
pub mod insights;
pub mod profile;

pub use aggregator::{Aggregation, FarmerDataAggregator, FetchPlan};
pub use profile::{InMemoryProfileRepository, PgProfileRepository, ProfileRepository, ProfileService};

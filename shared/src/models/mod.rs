//! Domain models for the Farm Insights Platform

mod farm_data;
mod field_data;
mod insights;
mod profile;
mod weather;

pub use farm_data::*;
pub use field_data::*;
pub use insights::*;
pub use profile::*;
pub use weather::*;

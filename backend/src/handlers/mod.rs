//! HTTP handlers for the Farm Insights Platform

pub mod debug;
pub mod farmer_data;
pub mod health;
pub mod profile;

pub use debug::debug_user;
pub use farmer_data::get_farmer_data;
pub use health::health_check;
pub use profile::create_comprehensive_profile;

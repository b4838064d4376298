//! Models for the Farm Insights Platform
//!
//! Re-exports the domain models from the shared crate

pub use shared::models::*;

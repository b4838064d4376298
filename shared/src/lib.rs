//! Shared types and models for the Farm Insights Platform
//!
//! This crate contains types shared between the backend, the browser (via
//! WASM), and other components of the system.

pub mod models;
pub mod onboarding;
pub mod satellite;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;

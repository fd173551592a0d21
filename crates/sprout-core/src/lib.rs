//! `sprout-core` — configuration, shared errors and the plant classification
//! record consumed by the garden engine.

pub mod classify;
pub mod config;
pub mod error;

pub use classify::{classify_or_fallback, Classifier, PlantClassification};
pub use config::SproutConfig;
pub use error::{Result, SproutError};

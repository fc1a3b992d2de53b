// src/config/mod.rs
pub mod scoring;
pub mod settings;

pub use scoring::ScoringConfig;
pub use settings::Settings;

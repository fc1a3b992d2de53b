// src/analyze/mod.rs
//! Scoring core: tokenizer, date normalizer, and the resonance scorer.

pub mod dates;
pub mod scoring;
pub mod tokenizer;

// Re-export convenient types.
pub use crate::analyze::dates::parse_date;
pub use crate::analyze::scoring::{ScoreReport, Scorer, TopVocabulary};
pub use crate::analyze::tokenizer::Tokenizer;

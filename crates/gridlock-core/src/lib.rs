//! # Gridlock Core Library
//!
//! Core business logic for Gridlock, a document-driven commute congestion
//! estimator. A structured knowledge document is parsed once into a typed
//! [`TrafficConfig`]; per-request work is a pure pipeline over that snapshot:
//!
//! - **ConfigParser**: document text to a validated [`TrafficConfig`]
//! - **ScoringEngine**: (origin, destination, time, config) to a
//!   [`CongestionResult`]
//! - **ReasoningEngine**: result plus document templates to explanations
//! - **ContentFilter**: tone filtering of generated text
//! - **TrafficController**: orchestration and the atomic snapshot swap
//!
//! The CLI binary is a thin layer over this crate.

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod model;
pub mod reasoning;
pub mod scoring;

pub use config::ConfigParser;
pub use controller::TrafficController;
pub use error::{ConfigError, CoreError, Result};
pub use filter::{ContentFilter, FilterPreferences};
pub use model::{
    AreaInfo, CongestionLevel, CongestionResult, ExplanationTemplates, PeakWindows, RuleKey,
    ScoringRule, ScoringRules, TimeRange, TrafficAnalysis, TrafficConfig, ValidationResult,
    IT_CORRIDOR_ZONE,
};
pub use reasoning::{Explanation, ReasoningEngine, DATASET_MISS_MESSAGE};
pub use scoring::{ScoringEngine, LEAVE_NOW};

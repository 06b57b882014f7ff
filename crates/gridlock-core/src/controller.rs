//! Request orchestration over an immutable config snapshot.
//!
//! The controller composes parser, scoring, reasoning, and filtering. The
//! only shared state is the current [`TrafficConfig`] snapshot, published
//! behind a lock as an `Arc` so a reload is a single pointer swap: in-flight
//! requests keep whichever complete snapshot they cloned.

use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::NaiveDateTime;

use crate::config::ConfigParser;
use crate::error::ConfigError;
use crate::filter::{ContentFilter, FilterPreferences};
use crate::model::{
    AreaInfo, CongestionLevel, CongestionResult, RuleKey, TrafficAnalysis, TrafficConfig,
    ValidationResult,
};
use crate::reasoning::ReasoningEngine;
use crate::scoring::{ScoringEngine, LEAVE_NOW};

enum Snapshot {
    Ready(Arc<TrafficConfig>),
    Failed(String),
}

/// Orchestrates one-shot route analyses against the loaded knowledge document.
///
/// A controller whose document failed to load stays usable: every call
/// returns a degraded result carrying the recorded error.
pub struct TrafficController {
    state: RwLock<Snapshot>,
}

impl TrafficController {
    /// Load the knowledge document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match ConfigParser::load(path) {
            Ok(config) => Self::ready(config),
            Err(err) => Self::failed(err),
        }
    }

    /// Parse the knowledge document from text.
    pub fn from_text(text: &str) -> Self {
        match ConfigParser::parse(text) {
            Ok(config) => Self::ready(config),
            Err(err) => Self::failed(err),
        }
    }

    fn ready(config: TrafficConfig) -> Self {
        let validation = ConfigParser::validate(&config);
        if !validation.is_valid {
            log::warn!("knowledge document has validation errors: {:?}", validation.errors);
        }
        for warning in &validation.warnings {
            log::warn!("knowledge document: {warning}");
        }
        Self {
            state: RwLock::new(Snapshot::Ready(Arc::new(config))),
        }
    }

    fn failed(err: ConfigError) -> Self {
        log::warn!("knowledge document unavailable: {err}");
        Self {
            state: RwLock::new(Snapshot::Failed(err.to_string())),
        }
    }

    /// The load error recorded at construction or last failed reload, if any.
    pub fn init_error(&self) -> Option<String> {
        match &*self.state.read().expect("config lock poisoned") {
            Snapshot::Ready(_) => None,
            Snapshot::Failed(err) => Some(err.clone()),
        }
    }

    /// Parse a new document and atomically swap it in. On error the previous
    /// snapshot stays live.
    pub fn reload_from_text(&self, text: &str) -> Result<ValidationResult, ConfigError> {
        let config = ConfigParser::parse(text)?;
        let validation = ConfigParser::validate(&config);
        *self.state.write().expect("config lock poisoned") = Snapshot::Ready(Arc::new(config));
        Ok(validation)
    }

    /// Reload the document from disk, swapping atomically on success.
    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<ValidationResult, ConfigError> {
        let config = ConfigParser::load(path)?;
        let validation = ConfigParser::validate(&config);
        *self.state.write().expect("config lock poisoned") = Snapshot::Ready(Arc::new(config));
        Ok(validation)
    }

    fn snapshot(&self) -> Result<Arc<TrafficConfig>, String> {
        match &*self.state.read().expect("config lock poisoned") {
            Snapshot::Ready(config) => Ok(Arc::clone(config)),
            Snapshot::Failed(err) => Err(err.clone()),
        }
    }

    /// Analyze a route at a departure time.
    pub fn analyze_route(
        &self,
        origin: &str,
        destination: &str,
        departure_time: NaiveDateTime,
    ) -> TrafficAnalysis {
        let config = match self.snapshot() {
            Ok(config) => config,
            Err(err) => return Self::degraded(err),
        };
        if origin.trim().is_empty() {
            return Self::degraded("Origin location cannot be empty".to_string());
        }
        if destination.trim().is_empty() {
            return Self::degraded("Destination location cannot be empty".to_string());
        }

        let congestion = ScoringEngine::calculate(origin, destination, departure_time, &config);

        if congestion.triggered_rules.contains(&RuleKey::UnknownArea) {
            let detailed = congestion.reasoning.clone();
            return TrafficAnalysis {
                congestion,
                hotspot_warnings: Vec::new(),
                departure_window: String::new(),
                detailed_reasoning: detailed,
            };
        }

        let explanation = ReasoningEngine::explain(&congestion, &config.explanation_templates);

        let mut hotspot_warnings = Vec::new();
        if config.is_hotspot(origin) {
            hotspot_warnings.push(format!("Origin {} is a known traffic hotspot", origin.trim()));
        }
        if config.is_hotspot(destination) {
            hotspot_warnings.push(format!(
                "Destination {} is a known traffic hotspot",
                destination.trim()
            ));
        }

        let departure_window = if congestion.departure_recommendation == LEAVE_NOW {
            format!(
                "Optimal departure: now (around {})",
                departure_time.format("%H:%M")
            )
        } else {
            format!("Consider: {}", congestion.departure_recommendation)
        };

        TrafficAnalysis {
            congestion,
            hotspot_warnings,
            departure_window,
            detailed_reasoning: explanation.detailed,
        }
    }

    /// Analyze a route, then filter every text field per the preferences.
    pub fn analyze_route_with_preferences(
        &self,
        origin: &str,
        destination: &str,
        departure_time: NaiveDateTime,
        avoid_nightlife: bool,
        prefer_family_friendly: bool,
    ) -> TrafficAnalysis {
        let preferences = FilterPreferences {
            avoid_nightlife,
            prefer_family_friendly,
        };
        let analysis = self.analyze_route(origin, destination, departure_time);

        TrafficAnalysis {
            congestion: CongestionResult {
                level: analysis.congestion.level,
                score: analysis.congestion.score,
                triggered_rules: analysis.congestion.triggered_rules.clone(),
                departure_recommendation: ContentFilter::filter(
                    &analysis.congestion.departure_recommendation,
                    &preferences,
                ),
                reasoning: ContentFilter::filter(&analysis.congestion.reasoning, &preferences),
            },
            hotspot_warnings: ContentFilter::filter_suggestions(
                &analysis.hotspot_warnings,
                &preferences,
            ),
            departure_window: ContentFilter::filter(&analysis.departure_window, &preferences),
            detailed_reasoning: ContentFilter::filter(&analysis.detailed_reasoning, &preferences),
        }
    }

    /// Zone and hotspot classification for one area name.
    pub fn get_area_info(&self, area_name: &str) -> AreaInfo {
        let name = area_name.trim().to_string();
        let Ok(config) = self.snapshot() else {
            return AreaInfo {
                name,
                zone: None,
                is_hotspot: false,
                nearby_landmark: None,
            };
        };
        AreaInfo {
            zone: config.zone_of(&name).map(str::to_string),
            is_hotspot: config.is_hotspot(&name),
            nearby_landmark: config.matching_hotspot(&name).map(str::to_string),
            name,
        }
    }

    /// Prompt describing how to add an unknown area to the document.
    pub fn suggest_area_addition(&self, area_name: &str) -> String {
        ReasoningEngine::suggest_area_addition(area_name)
    }

    fn degraded(error: String) -> TrafficAnalysis {
        TrafficAnalysis {
            congestion: CongestionResult {
                level: CongestionLevel::High,
                score: CongestionLevel::High.ordinal(),
                triggered_rules: Vec::new(),
                departure_recommendation: LEAVE_NOW.to_string(),
                reasoning: error.clone(),
            },
            hotspot_warnings: Vec::new(),
            departure_window: String::new(),
            detailed_reasoning: error,
        }
    }
}

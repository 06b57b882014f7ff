//! Domain model for the congestion estimator.
//!
//! Everything in here is plain data: the parsed knowledge document
//! ([`TrafficConfig`]), the scoring output ([`CongestionResult`]), and the
//! assembled per-request answer ([`TrafficAnalysis`]).

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A wall-clock time-of-day range. Construction enforces `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    /// Create a range, rejecting empty or inverted ranges.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Inclusive containment check on both bounds.
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t <= self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Peak traffic windows extracted from the knowledge document.
///
/// `heaviest_band` is a narrower sub-range nested within the evening window;
/// when the document names no band the parser falls back to the full evening
/// window. `weekend_pattern` is advisory free text and never scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakWindows {
    pub weekday_morning: Option<TimeRange>,
    pub weekday_evening: Option<TimeRange>,
    pub heaviest_band: Option<TimeRange>,
    pub weekend_pattern: String,
}

impl PeakWindows {
    /// True when neither weekday window could be extracted.
    pub fn is_empty(&self) -> bool {
        self.weekday_morning.is_none() && self.weekday_evening.is_none()
    }
}

/// Zone tag reserved for the IT-corridor rule.
pub const IT_CORRIDOR_ZONE: &str = "zone_it_corridor";

/// Closed set of scoring rule identifiers.
///
/// These double as template keys in the knowledge document, so the rendered
/// form (`peak`, `it_corridor`, ...) is part of the document contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKey {
    Peak,
    ItCorridor,
    Hotspot,
    Weekend,
    UnknownArea,
}

impl RuleKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKey::Peak => "peak",
            RuleKey::ItCorridor => "it_corridor",
            RuleKey::Hotspot => "hotspot",
            RuleKey::Weekend => "weekend",
            RuleKey::UnknownArea => "unknown_area",
        }
    }

    /// Parse a document key. Returns `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "peak" => Some(RuleKey::Peak),
            "it_corridor" => Some(RuleKey::ItCorridor),
            "hotspot" => Some(RuleKey::Hotspot),
            "weekend" => Some(RuleKey::Weekend),
            "unknown_area" => Some(RuleKey::UnknownArea),
            _ => None,
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule key to explanation sentence, as written in the document.
pub type ExplanationTemplates = BTreeMap<RuleKey, String>;

/// One ordered adjustment step from the scoring-rules section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub key: RuleKey,
    pub delta: i32,
}

/// Ordered adjustment steps with their magnitudes.
///
/// Kept as config-derived data so the document stays the single source of
/// truth; the engine only falls back to ±1 for steps the document omits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub rules: Vec<ScoringRule>,
}

impl ScoringRules {
    /// Magnitude for a rule, defaulting to +1 (-1 for the weekend reduction).
    pub fn delta(&self, key: RuleKey) -> i32 {
        self.rules
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.delta)
            .unwrap_or(match key {
                RuleKey::Weekend => -1,
                _ => 1,
            })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The parsed, validated knowledge document.
///
/// Constructed once by the parser and treated as immutable; a reload builds a
/// brand-new instance which the controller swaps in atomically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficConfig {
    pub peak_windows: PeakWindows,
    /// Zone tag to area names; areas keep document order within a zone.
    pub zones: BTreeMap<String, Vec<String>>,
    /// Known bottleneck areas, independent of zone membership.
    pub hotspots: Vec<String>,
    pub explanation_templates: ExplanationTemplates,
    pub scoring_rules: ScoringRules,
    /// Lines the parser skipped, surfaced through `validate`.
    #[serde(default)]
    pub parse_warnings: Vec<String>,
}

/// Case-insensitive, substring-tolerant area comparison.
///
/// "HITEC City" matches "hitec city" and "near HITEC City" both ways; this is
/// the document contract for area lookup everywhere in the crate.
pub(crate) fn area_matches(known: &str, query: &str) -> bool {
    let known = known.trim().to_lowercase();
    let query = query.trim().to_lowercase();
    if known.is_empty() || query.is_empty() {
        return false;
    }
    known == query || known.contains(&query) || query.contains(&known)
}

impl TrafficConfig {
    /// Resolve the zone tag an area belongs to, if any.
    pub fn zone_of(&self, area: &str) -> Option<&str> {
        for (tag, areas) in &self.zones {
            if areas.iter().any(|a| area_matches(a, area)) {
                return Some(tag.as_str());
            }
        }
        None
    }

    /// Whether an area sits in a specific zone.
    pub fn in_zone(&self, area: &str, zone_tag: &str) -> bool {
        self.zones
            .get(zone_tag)
            .map(|areas| areas.iter().any(|a| area_matches(a, area)))
            .unwrap_or(false)
    }

    pub fn is_hotspot(&self, area: &str) -> bool {
        self.hotspots.iter().any(|h| area_matches(h, area))
    }

    /// First hotspot matching an area, display case preserved.
    pub fn matching_hotspot(&self, area: &str) -> Option<&str> {
        self.hotspots
            .iter()
            .find(|h| area_matches(h, area))
            .map(String::as_str)
    }

    /// An area is known when it resolves to a zone or the hotspot set.
    pub fn knows_area(&self, area: &str) -> bool {
        self.zone_of(area).is_some() || self.is_hotspot(area)
    }
}

/// The system's sole output classification, ordinal-backed so clamped
/// arithmetic is well-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CongestionLevel {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl CongestionLevel {
    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Map a raw score onto the enum, clamping to `[Low, High]`.
    pub fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=1 => CongestionLevel::Low,
            2 => CongestionLevel::Medium,
            _ => CongestionLevel::High,
        }
    }

    /// Apply a delta with the clamp, as used after every scoring step.
    pub fn stepped(self, delta: i32) -> Self {
        Self::from_score(self.ordinal() + delta)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionLevel::Low => "Low",
            CongestionLevel::Medium => "Medium",
            CongestionLevel::High => "High",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the scoring pass for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionResult {
    pub level: CongestionLevel,
    /// Raw pre-clamp sum, kept for diagnostics.
    pub score: i32,
    /// Rule keys that fired, in application order, each at most once.
    pub triggered_rules: Vec<RuleKey>,
    /// Exactly "leave now" or "wait until HH:MM".
    pub departure_recommendation: String,
    /// Short explanation for the dominant rule.
    pub reasoning: String,
}

/// Complete per-request answer assembled by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficAnalysis {
    pub congestion: CongestionResult,
    pub hotspot_warnings: Vec<String>,
    pub departure_window: String,
    pub detailed_reasoning: String,
}

/// Zone and hotspot classification for a single area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaInfo {
    pub name: String,
    /// Resolved zone tag; `None` surfaces to callers as "unknown".
    pub zone: Option<String>,
    pub is_hotspot: bool,
    pub nearby_landmark: Option<String>,
}

/// Outcome of validating a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_time_range_rejects_inverted() {
        assert!(TimeRange::new(t(9, 0), t(8, 0)).is_none());
        assert!(TimeRange::new(t(9, 0), t(9, 0)).is_none());
        assert!(TimeRange::new(t(8, 0), t(11, 0)).is_some());
    }

    #[test]
    fn test_time_range_contains_is_inclusive() {
        let range = TimeRange::new(t(8, 0), t(11, 0)).unwrap();
        assert!(range.contains(t(8, 0)));
        assert!(range.contains(t(11, 0)));
        assert!(range.contains(t(9, 30)));
        assert!(!range.contains(t(7, 59)));
        assert!(!range.contains(t(11, 1)));
    }

    #[test]
    fn test_level_ordinals() {
        assert_eq!(CongestionLevel::Low.ordinal(), 1);
        assert_eq!(CongestionLevel::Medium.ordinal(), 2);
        assert_eq!(CongestionLevel::High.ordinal(), 3);
    }

    #[test]
    fn test_level_from_score_clamps() {
        assert_eq!(CongestionLevel::from_score(-3), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_score(0), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_score(1), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_score(2), CongestionLevel::Medium);
        assert_eq!(CongestionLevel::from_score(3), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_score(7), CongestionLevel::High);
    }

    #[test]
    fn test_level_stepped_caps_and_floors() {
        assert_eq!(
            CongestionLevel::High.stepped(1),
            CongestionLevel::High
        );
        assert_eq!(CongestionLevel::Low.stepped(-1), CongestionLevel::Low);
        assert_eq!(
            CongestionLevel::Medium.stepped(1),
            CongestionLevel::High
        );
    }

    #[test]
    fn test_rule_key_round_trip() {
        for key in [
            RuleKey::Peak,
            RuleKey::ItCorridor,
            RuleKey::Hotspot,
            RuleKey::Weekend,
            RuleKey::UnknownArea,
        ] {
            assert_eq!(RuleKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(RuleKey::parse("nonsense"), None);
    }

    #[test]
    fn test_scoring_rules_defaults() {
        let rules = ScoringRules::default();
        assert_eq!(rules.delta(RuleKey::Peak), 1);
        assert_eq!(rules.delta(RuleKey::Weekend), -1);

        let rules = ScoringRules {
            rules: vec![ScoringRule {
                key: RuleKey::Peak,
                delta: 2,
            }],
        };
        assert_eq!(rules.delta(RuleKey::Peak), 2);
        assert_eq!(rules.delta(RuleKey::Hotspot), 1);
    }

    #[test]
    fn test_area_matching_is_case_insensitive_and_substring_tolerant() {
        assert!(area_matches("HITEC City", "hitec city"));
        assert!(area_matches("Ameerpet", "near Ameerpet"));
        assert!(area_matches("near Ameerpet", "Ameerpet"));
        assert!(!area_matches("Ameerpet", "Kondapur"));
        assert!(!area_matches("", "Kondapur"));
    }

    #[test]
    fn test_enum_json_renderings_are_stable() {
        // The CLI's --json output leans on these exact spellings.
        assert_eq!(
            serde_json::to_string(&CongestionLevel::High).unwrap(),
            r#""High""#
        );
        assert_eq!(
            serde_json::to_string(&RuleKey::ItCorridor).unwrap(),
            r#""it_corridor""#
        );
    }

    #[test]
    fn test_config_lookups() {
        let mut config = TrafficConfig::default();
        config.zones.insert(
            IT_CORRIDOR_ZONE.to_string(),
            vec!["Gachibowli".to_string(), "Madhapur".to_string()],
        );
        config.hotspots.push("Ameerpet".to_string());

        assert_eq!(config.zone_of("gachibowli"), Some(IT_CORRIDOR_ZONE));
        assert!(config.in_zone("Madhapur", IT_CORRIDOR_ZONE));
        assert!(config.is_hotspot("AMEERPET"));
        assert_eq!(config.matching_hotspot("ameerpet"), Some("Ameerpet"));
        assert!(config.knows_area("Ameerpet"));
        assert!(!config.knows_area("Nowhere"));
    }
}

//! Congestion scoring engine.
//!
//! `calculate` is a pure function of (origin, destination, time, config):
//! identical inputs always yield an identical result. Rule magnitudes come
//! from the document's scoring-rules section, not from constants here.

use chrono::{Datelike, NaiveDateTime};

use crate::model::{
    CongestionLevel, CongestionResult, PeakWindows, RuleKey, TimeRange, TrafficConfig,
    IT_CORRIDOR_ZONE,
};
use crate::reasoning::{ReasoningEngine, DATASET_MISS_MESSAGE};

/// Recommendation literal for routes with no reason to wait.
pub const LEAVE_NOW: &str = "leave now";

/// Stateless scoring engine.
pub struct ScoringEngine;

impl ScoringEngine {
    /// Score a route at a departure time against the current config.
    ///
    /// Application order is fixed: base, peak, heaviest band, IT corridor,
    /// hotspot, weekend. The level is clamped to `[Low, High]` after every
    /// step; `score` keeps the raw pre-clamp sum for diagnostics.
    pub fn calculate(
        origin: &str,
        destination: &str,
        departure: NaiveDateTime,
        config: &TrafficConfig,
    ) -> CongestionResult {
        if !config.knows_area(origin) || !config.knows_area(destination) {
            let level = CongestionLevel::Medium;
            return CongestionResult {
                level,
                score: level.ordinal(),
                triggered_rules: vec![RuleKey::UnknownArea],
                departure_recommendation: Self::recommendation(
                    level,
                    departure,
                    &config.peak_windows,
                ),
                reasoning: DATASET_MISS_MESSAGE.to_string(),
            };
        }

        let windows = &config.peak_windows;
        if windows.is_empty() {
            // Conservative answer when the document gave us no peak windows.
            return CongestionResult {
                level: CongestionLevel::High,
                score: CongestionLevel::High.ordinal(),
                triggered_rules: Vec::new(),
                departure_recommendation: LEAVE_NOW.to_string(),
                reasoning: "Peak window data is unavailable; assuming heavy traffic.".to_string(),
            };
        }

        let time = departure.time();
        let weekday = is_weekday(departure);
        let in_peak = weekday
            && (windows.weekday_morning.is_some_and(|w| w.contains(time))
                || windows.weekday_evening.is_some_and(|w| w.contains(time)));
        let in_heaviest = in_peak && windows.heaviest_band.is_some_and(|b| b.contains(time));
        let touches_corridor = config.in_zone(origin, IT_CORRIDOR_ZONE)
            || config.in_zone(destination, IT_CORRIDOR_ZONE);
        let touches_hotspot = config.is_hotspot(origin) || config.is_hotspot(destination);

        let rules = &config.scoring_rules;
        let mut level = CongestionLevel::Low;
        let mut raw = level.ordinal();
        let mut triggered: Vec<RuleKey> = Vec::new();

        let mut apply = |fired: bool, key: RuleKey, record: bool| {
            if fired {
                let delta = rules.delta(key);
                level = level.stepped(delta);
                raw += delta;
                if record && !triggered.contains(&key) {
                    triggered.push(key);
                }
            }
        };

        apply(in_peak, RuleKey::Peak, true);
        // Heaviest band adds a second step under the same rule key.
        apply(in_heaviest, RuleKey::Peak, false);
        apply(in_peak && touches_corridor, RuleKey::ItCorridor, true);
        apply(in_peak && touches_hotspot, RuleKey::Hotspot, true);
        apply(!weekday && !touches_hotspot, RuleKey::Weekend, true);

        let mut result = CongestionResult {
            level,
            score: raw,
            triggered_rules: triggered,
            departure_recommendation: Self::recommendation(level, departure, windows),
            reasoning: String::new(),
        };
        result.reasoning = ReasoningEngine::explain(&result, &config.explanation_templates).short;
        result
    }

    /// "leave now" when the level is Low or the time is outside every peak
    /// window; otherwise wait until the active window ends.
    fn recommendation(
        level: CongestionLevel,
        departure: NaiveDateTime,
        windows: &PeakWindows,
    ) -> String {
        match (level, active_window(departure, windows)) {
            (CongestionLevel::Low, _) | (_, None) => LEAVE_NOW.to_string(),
            (_, Some(window)) => format!("wait until {}", window.end.format("%H:%M")),
        }
    }
}

fn is_weekday(departure: NaiveDateTime) -> bool {
    departure.weekday().number_from_monday() <= 5
}

/// The weekday peak window containing the departure time, if any.
fn active_window(departure: NaiveDateTime, windows: &PeakWindows) -> Option<TimeRange> {
    if !is_weekday(departure) {
        return None;
    }
    let time = departure.time();
    windows
        .weekday_morning
        .filter(|w| w.contains(time))
        .or_else(|| windows.weekday_evening.filter(|w| w.contains(time)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigParser;
    use chrono::NaiveDate;
    use indoc::indoc;

    const SAMPLE_DOC: &str = indoc! {r#"
        ## Peak windows
        - weekday morning peak: 08:00–11:00
        - weekday evening peak: 17:00–20:00 (treat 18:00–19:00 as heaviest)
        - weekends: lighter mornings; evenings can still be busy

        ## Zones
        - zone_it_corridor:
          - Gachibowli
          - HITEC City
          - Madhapur
          - Kondapur
        - zone_central:
          - Ameerpet
          - Punjagutta
          - Begumpet
        - zone_core:
          - Jubilee Hills
          - Banjara Hills

        ## Hotspots
        - Ameerpet
        - Secunderabad
        - HITEC City

        ## Explanation templates
        - peak: "Departure time falls in a typical peak window."
        - it_corridor: "One endpoint is in the west/IT corridor, which usually amplifies peak-hour congestion."
        - hotspot: "This route touches a known slow zone, so delays are more likely."
        - weekend: "Weekend traffic is often smoother unless you're near busy hotspots."

        ## Scoring rules
        - peak: +1
        - it_corridor: +1
        - hotspot: +1
        - weekend: -1
    "#};

    fn config() -> TrafficConfig {
        ConfigParser::parse(SAMPLE_DOC).unwrap()
    }

    // 2026-08-24 is a Monday, 2026-08-29 a Saturday.
    fn monday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn saturday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 29)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_corridor_hotspot_morning_peak_is_high() {
        let result = ScoringEngine::calculate("Gachibowli", "Ameerpet", monday(9, 0), &config());

        assert_eq!(result.level, CongestionLevel::High);
        for key in [RuleKey::Peak, RuleKey::ItCorridor, RuleKey::Hotspot] {
            assert!(result.triggered_rules.contains(&key), "missing {key}");
        }
        assert_eq!(result.departure_recommendation, "wait until 11:00");
    }

    #[test]
    fn test_quiet_weekend_route_is_low() {
        let result =
            ScoringEngine::calculate("Jubilee Hills", "Banjara Hills", saturday(10, 0), &config());

        assert_eq!(result.level, CongestionLevel::Low);
        assert_eq!(result.triggered_rules, vec![RuleKey::Weekend]);
        assert_eq!(result.departure_recommendation, "leave now");
    }

    #[test]
    fn test_unknown_area_short_circuits_with_literal_message() {
        let config = config();
        for (origin, destination) in [("Atlantis", "Ameerpet"), ("Ameerpet", "Atlantis")] {
            let result = ScoringEngine::calculate(origin, destination, monday(9, 0), &config);
            assert_eq!(result.level, CongestionLevel::Medium);
            assert_eq!(result.triggered_rules, vec![RuleKey::UnknownArea]);
            assert_eq!(
                result.reasoning,
                "That area isn't in my local dataset yet—add it to product.md"
            );
        }
    }

    #[test]
    fn test_heaviest_band_adds_a_second_step_without_duplicate_key() {
        let config = config();

        // 17:30 is evening peak but outside the 18:00-19:00 band.
        let outside = ScoringEngine::calculate("Begumpet", "Punjagutta", monday(17, 30), &config);
        assert_eq!(outside.level, CongestionLevel::Medium);

        // 18:30 is inside the band: one extra step, same single rule key.
        let inside = ScoringEngine::calculate("Begumpet", "Punjagutta", monday(18, 30), &config);
        assert_eq!(inside.level, CongestionLevel::High);
        assert_eq!(inside.triggered_rules, vec![RuleKey::Peak]);
    }

    #[test]
    fn test_weekend_is_one_step_below_weekday_with_floor() {
        let config = config();

        // Off-peak: weekday Low, weekend floored at Low.
        let weekday = ScoringEngine::calculate("Begumpet", "Punjagutta", monday(13, 0), &config);
        let weekend = ScoringEngine::calculate("Begumpet", "Punjagutta", saturday(13, 0), &config);
        assert_eq!(weekday.level, CongestionLevel::Low);
        assert_eq!(weekend.level, CongestionLevel::Low);

        // Morning peak hour: weekday Medium, weekend one step lower.
        let weekday = ScoringEngine::calculate("Begumpet", "Punjagutta", monday(9, 0), &config);
        let weekend = ScoringEngine::calculate("Begumpet", "Punjagutta", saturday(9, 0), &config);
        assert_eq!(weekday.level, CongestionLevel::Medium);
        assert_eq!(weekend.level, CongestionLevel::Low);
    }

    #[test]
    fn test_weekend_reduction_skipped_for_hotspot_routes() {
        let result =
            ScoringEngine::calculate("Ameerpet", "Jubilee Hills", saturday(10, 0), &config());
        assert_eq!(result.level, CongestionLevel::Low);
        assert!(!result.triggered_rules.contains(&RuleKey::Weekend));
        assert!(result.triggered_rules.is_empty());
    }

    #[test]
    fn test_corridor_and_hotspot_need_the_peak_condition() {
        // Known corridor + hotspot route at an off-peak weekday hour.
        let result = ScoringEngine::calculate("Gachibowli", "Ameerpet", monday(13, 0), &config());
        assert_eq!(result.level, CongestionLevel::Low);
        assert!(result.triggered_rules.is_empty());
        assert_eq!(result.departure_recommendation, "leave now");
    }

    #[test]
    fn test_evening_peak_recommends_waiting_until_window_end() {
        let result = ScoringEngine::calculate("Begumpet", "Ameerpet", monday(18, 30), &config());
        assert_eq!(result.departure_recommendation, "wait until 20:00");
    }

    #[test]
    fn test_raw_score_keeps_pre_clamp_sum() {
        let result = ScoringEngine::calculate("Gachibowli", "Ameerpet", monday(9, 0), &config());
        // base 1 + peak 1 + corridor 1 + hotspot 1 = 4, clamped to High.
        assert_eq!(result.score, 4);
        assert_eq!(result.level, CongestionLevel::High);
    }

    #[test]
    fn test_missing_peak_windows_fall_back_to_conservative_high() {
        let doc = SAMPLE_DOC
            .replace("- weekday morning peak: 08:00–11:00", "")
            .replace(
                "- weekday evening peak: 17:00–20:00 (treat 18:00–19:00 as heaviest)",
                "",
            );
        let config = ConfigParser::parse(&doc).unwrap();
        assert!(config.peak_windows.is_empty());

        let result = ScoringEngine::calculate("Gachibowli", "Ameerpet", monday(9, 0), &config);
        assert_eq!(result.level, CongestionLevel::High);
        assert_eq!(result.departure_recommendation, "leave now");
    }

    #[test]
    fn test_calculate_is_deterministic() {
        let config = config();
        let a = ScoringEngine::calculate("Gachibowli", "Ameerpet", monday(9, 0), &config);
        let b = ScoringEngine::calculate("Gachibowli", "Ameerpet", monday(9, 0), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_area_matching_is_case_insensitive_in_scoring() {
        let result = ScoringEngine::calculate("gachibowli", "AMEERPET", monday(9, 0), &config());
        assert_eq!(result.level, CongestionLevel::High);
    }
}

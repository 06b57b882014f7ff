//! Knowledge-document parser and validator.
//!
//! The document is scanned as an ordered sequence of heading and bullet
//! lines with current-section state. Parsing is tolerant line-by-line: an
//! unparsable line is skipped and recorded as a warning, never aborts the
//! load. `parse` fails only when no required section can be located at all.

use std::fs;
use std::path::Path;

use chrono::NaiveTime;

use crate::error::ConfigError;
use crate::model::{RuleKey, ScoringRule, TimeRange, TrafficConfig, ValidationResult};

/// Parser for the traffic knowledge document.
pub struct ConfigParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    PeakWindows,
    Zones,
    Hotspots,
    Templates,
    ScoringRules,
    Other,
}

impl ConfigParser {
    /// Read and parse a document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<TrafficConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse document text into a best-effort [`TrafficConfig`].
    pub fn parse(text: &str) -> Result<TrafficConfig, ConfigError> {
        let mut config = TrafficConfig::default();
        let mut section = Section::None;
        let mut current_zone: Option<String> = None;
        let mut any_required_section = false;

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('#') {
                let heading = line.trim_start_matches('#').trim();
                let lower = heading.to_lowercase();

                // A zone subheading stays inside the zones section.
                if section == Section::Zones && lower.starts_with("zone_") {
                    let tag = heading.trim_end_matches(':').to_string();
                    config.zones.entry(tag.clone()).or_default();
                    current_zone = Some(tag);
                    continue;
                }

                current_zone = None;
                section = if lower.contains("peak window") {
                    any_required_section = true;
                    Section::PeakWindows
                } else if lower.contains("hotspot") {
                    any_required_section = true;
                    Section::Hotspots
                } else if lower.contains("explanation template") {
                    any_required_section = true;
                    Section::Templates
                } else if lower.contains("scoring") {
                    any_required_section = true;
                    Section::ScoringRules
                } else if lower.contains("zone") {
                    any_required_section = true;
                    Section::Zones
                } else {
                    Section::Other
                };
                continue;
            }

            let bullet = line
                .strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .map(str::trim);

            match section {
                Section::PeakWindows => {
                    Self::parse_peak_line(line, &mut config);
                }
                Section::Zones => {
                    if let Some(entry) = bullet {
                        Self::parse_zone_bullet(entry, &mut current_zone, &mut config);
                    }
                }
                Section::Hotspots => {
                    if let Some(entry) = bullet {
                        // Grouping labels end with a colon; everything else is
                        // a hotspot regardless of its visual subgrouping.
                        if !entry.ends_with(':') && !entry.is_empty() {
                            push_unique(&mut config.hotspots, entry);
                        }
                    }
                }
                Section::Templates => {
                    if let Some(entry) = bullet {
                        Self::parse_template_bullet(entry, &mut config);
                    }
                }
                Section::ScoringRules => {
                    if let Some(entry) = bullet {
                        Self::parse_scoring_bullet(entry, &mut config);
                    }
                }
                Section::None | Section::Other => {}
            }
        }

        if !any_required_section {
            return Err(ConfigError::Malformed(
                "no recognizable sections found in document".to_string(),
            ));
        }

        // The heaviest band is nested in the evening window; without an
        // explicit band the whole evening window counts as heaviest.
        if config.peak_windows.heaviest_band.is_none() {
            config.peak_windows.heaviest_band = config.peak_windows.weekday_evening;
        }

        Ok(config)
    }

    /// Validate a parsed config: an error for each required section with zero
    /// extracted entries, warnings for everything recoverable.
    pub fn validate(config: &TrafficConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if config.peak_windows.is_empty() {
            errors.push("Peak windows configuration is missing".to_string());
        } else {
            if config.peak_windows.weekday_morning.is_none() {
                warnings.push("Weekday morning peak window is missing".to_string());
            }
            if config.peak_windows.weekday_evening.is_none() {
                warnings.push("Weekday evening peak window is missing".to_string());
            }
        }

        if config.zones.is_empty() {
            errors.push("Zones configuration is missing".to_string());
        }
        if config.hotspots.is_empty() {
            errors.push("Hotspots configuration is missing".to_string());
        }
        if config.explanation_templates.is_empty() {
            errors.push("Explanation templates configuration is missing".to_string());
        } else {
            for key in [
                RuleKey::Peak,
                RuleKey::ItCorridor,
                RuleKey::Hotspot,
                RuleKey::Weekend,
            ] {
                if !config.explanation_templates.contains_key(&key) {
                    warnings.push(format!("Missing explanation template: {key}"));
                }
            }
        }
        if config.scoring_rules.is_empty() {
            errors.push("Scoring rules configuration is missing".to_string());
        }

        // An area may belong to at most one zone; ambiguity is a warning.
        let mut memberships: std::collections::BTreeMap<String, (&str, Vec<&str>)> =
            std::collections::BTreeMap::new();
        for (tag, areas) in &config.zones {
            for area in areas {
                memberships
                    .entry(area.to_lowercase())
                    .or_insert((area.as_str(), Vec::new()))
                    .1
                    .push(tag.as_str());
            }
        }
        for (display, tags) in memberships.values() {
            if tags.len() > 1 {
                warnings.push(format!(
                    "Area '{}' is listed in multiple zones: {}",
                    display,
                    tags.join(", ")
                ));
            }
        }

        warnings.extend(config.parse_warnings.iter().cloned());

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn parse_peak_line(line: &str, config: &mut TrafficConfig) {
        let lower = line.to_lowercase();

        if lower.contains("weekend") {
            let pattern = line
                .split_once(':')
                .map(|(_, rest)| rest.trim())
                .unwrap_or(line)
                .trim_start_matches("- ")
                .to_string();
            config.peak_windows.weekend_pattern = pattern;
            return;
        }

        let times = extract_times(line);
        if times.len() < 2 {
            if line.starts_with('-') || line.starts_with('*') {
                Self::skip(config, "peak windows", line);
            }
            return;
        }

        let first = TimeRange::new(times[0], times[1]);
        if first.is_none() {
            Self::skip(config, "peak windows", line);
            return;
        }

        // "treat X-Y as heaviest" may sit inline after the evening range, in
        // which case the band is the last range on the line.
        if lower.contains("heaviest") {
            if times.len() >= 4 {
                if lower.contains("evening") && config.peak_windows.weekday_evening.is_none() {
                    config.peak_windows.weekday_evening = first;
                }
                config.peak_windows.heaviest_band =
                    TimeRange::new(times[times.len() - 2], times[times.len() - 1])
                        .or(config.peak_windows.heaviest_band);
            } else {
                config.peak_windows.heaviest_band = first;
            }
            return;
        }

        if lower.contains("morning") {
            if config.peak_windows.weekday_morning.is_none() {
                config.peak_windows.weekday_morning = first;
            }
        } else if lower.contains("evening") {
            if config.peak_windows.weekday_evening.is_none() {
                config.peak_windows.weekday_evening = first;
            }
        } else {
            Self::skip(config, "peak windows", line);
        }
    }

    fn parse_zone_bullet(
        entry: &str,
        current_zone: &mut Option<String>,
        config: &mut TrafficConfig,
    ) {
        if entry.ends_with(':') {
            let label = entry.trim_end_matches(':').trim();
            if label.to_lowercase().starts_with("zone_") {
                *current_zone = Some(label.to_string());
                config.zones.entry(label.to_string()).or_default();
            } else {
                Self::skip(config, "zones", entry);
            }
            return;
        }

        match current_zone {
            Some(zone) => {
                if let Some(areas) = config.zones.get_mut(zone) {
                    push_unique(areas, entry);
                }
            }
            None => Self::skip(config, "zones", entry),
        }
    }

    fn parse_template_bullet(entry: &str, config: &mut TrafficConfig) {
        let Some((key_part, value_part)) = entry.split_once(':') else {
            Self::skip(config, "explanation templates", entry);
            return;
        };
        let Some(key) = RuleKey::parse(key_part) else {
            Self::skip(config, "explanation templates", entry);
            return;
        };
        let value = value_part.trim().trim_matches('"').trim();
        if value.is_empty() {
            Self::skip(config, "explanation templates", entry);
            return;
        }
        config
            .explanation_templates
            .insert(key, value.to_string());
    }

    fn parse_scoring_bullet(entry: &str, config: &mut TrafficConfig) {
        let Some((key_part, delta_part)) = entry.split_once(':') else {
            Self::skip(config, "scoring rules", entry);
            return;
        };
        let Some(key) = RuleKey::parse(key_part) else {
            Self::skip(config, "scoring rules", entry);
            return;
        };
        match delta_part.trim().trim_start_matches('+').parse::<i32>() {
            Ok(delta) => config.scoring_rules.rules.push(ScoringRule { key, delta }),
            Err(_) => Self::skip(config, "scoring rules", entry),
        }
    }

    fn skip(config: &mut TrafficConfig, section: &str, line: &str) {
        let warning = format!("Skipped unparsable line in {section}: '{line}'");
        log::warn!("{warning}");
        config.parse_warnings.push(warning);
    }
}

/// Add a trimmed name if not already present (case-insensitive).
fn push_unique(names: &mut Vec<String>, name: &str) {
    let name = name.trim();
    if name.is_empty() {
        return;
    }
    if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        names.push(name.to_string());
    }
}

/// Extract every `HH:MM` token on a line, in order.
fn extract_times(line: &str) -> Vec<NaiveTime> {
    let bytes = line.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let is_token = i - start <= 2
            && i + 2 < bytes.len()
            && bytes[i] == b':'
            && bytes[i + 1].is_ascii_digit()
            && bytes[i + 2].is_ascii_digit()
            && (i + 3 == bytes.len() || !bytes[i + 3].is_ascii_digit());
        if is_token {
            let hour = line[start..i].parse::<u32>().unwrap_or(u32::MAX);
            let minute = line[i + 1..i + 3].parse::<u32>().unwrap_or(u32::MAX);
            if let Some(t) = NaiveTime::from_hms_opt(hour, minute, 0) {
                out.push(t);
            }
            i += 3;
        }
    }
    out
}

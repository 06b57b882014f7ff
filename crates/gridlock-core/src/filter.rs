//! Content-tone filtering of generated text.
//!
//! Two rules live here. The hard rule: stop/break suggestions never carry
//! nightlife wording, whatever the caller asked for. The preference rule:
//! with `avoid_nightlife` enabled, any sentence touching a nightlife term is
//! replaced wholesale by a neutral stop suggestion from a fixed whitelist.
//! Filtering is a pure transform, idempotent, and keeps the input's line
//! structure so multi-line explanations stay one sentence per line.

use serde::{Deserialize, Serialize};

/// Caller preferences; both toggles default to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPreferences {
    pub avoid_nightlife: bool,
    pub prefer_family_friendly: bool,
}

/// Nightlife denylist, matched case-insensitively as substrings.
const NIGHTLIFE_TERMS: &[&str] = &[
    "nightclub",
    "nightlife",
    "night club",
    "bar",
    "pub",
    "club",
    "drinks",
    "brewery",
    "cocktail",
    "lounge",
    "liquor",
    "late night",
    "after hours",
];

/// Wordings that mark a sentence as a stop/break suggestion.
const SUGGESTION_WORDS: &[&str] = &["stop", "break", "rest", "suggest", "recommend"];

/// Neutral replacement when a sentence is dropped.
const QUIET_STOP: &str = "Consider a quiet stop along the way instead.";

/// Stronger family-friendly framing used when the caller prefers it.
const FAMILY_STOP: &str = "Take a peaceful break at a family-friendly spot along the way.";

/// Stateless text filter.
pub struct ContentFilter;

impl ContentFilter {
    /// Filter one block of text under the given preferences. Lines are
    /// filtered independently so the shape of multi-line text survives.
    pub fn filter(text: &str, preferences: &FilterPreferences) -> String {
        let mut replaced = false;
        let lines: Vec<String> = text
            .lines()
            .map(|line| {
                let (out, changed) = Self::filter_line(line, preferences);
                replaced |= changed;
                out
            })
            .collect();

        if replaced {
            lines.join("\n")
        } else {
            // No normalization when nothing was flagged, so filtering
            // already-filtered text is a no-op.
            text.to_string()
        }
    }

    fn filter_line(line: &str, preferences: &FilterPreferences) -> (String, bool) {
        let mut changed = false;
        let mut out: Vec<String> = Vec::new();

        for sentence in split_sentences(line) {
            if Self::should_replace(&sentence, preferences) {
                changed = true;
                out.push(Self::replacement(preferences).to_string());
            } else {
                out.push(sentence.trim().to_string());
            }
        }

        if changed {
            (out.join(" "), true)
        } else {
            (line.to_string(), false)
        }
    }

    /// Filter each suggestion, dropping any that end up empty.
    pub fn filter_suggestions(
        suggestions: &[String],
        preferences: &FilterPreferences,
    ) -> Vec<String> {
        suggestions
            .iter()
            .map(|s| Self::filter(s, preferences))
            .filter(|s| !s.trim().is_empty())
            .collect()
    }

    /// True when the sentence contains a denylisted term and either the
    /// caller avoids nightlife or the sentence is a stop/break suggestion
    /// (the unconditional rule).
    fn should_replace(sentence: &str, preferences: &FilterPreferences) -> bool {
        if !contains_nightlife(sentence) {
            return false;
        }
        preferences.avoid_nightlife || is_stop_suggestion(sentence)
    }

    fn replacement(preferences: &FilterPreferences) -> &'static str {
        if preferences.prefer_family_friendly {
            FAMILY_STOP
        } else {
            QUIET_STOP
        }
    }
}

pub(crate) fn contains_nightlife(text: &str) -> bool {
    let lower = text.to_lowercase();
    NIGHTLIFE_TERMS.iter().any(|term| lower.contains(term))
}

fn is_stop_suggestion(text: &str) -> bool {
    let lower = text.to_lowercase();
    SUGGESTION_WORDS.iter().any(|word| lower.contains(word))
}

/// Split into sentences on terminal punctuation, keeping the delimiter.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            if !current.trim().is_empty() {
                sentences.push(current.clone());
            }
            current.clear();
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current);
    }
    sentences
}

//! Explanation generation from scoring results and document templates.
//!
//! Template rendering is a key-to-string lookup with fallbacks, nothing more.

use crate::model::{CongestionResult, ExplanationTemplates, RuleKey};

/// Literal response when an area is absent from the dataset. Byte-exact for
/// compatibility with existing consumers.
pub const DATASET_MISS_MESSAGE: &str =
    "That area isn't in my local dataset yet—add it to product.md";

/// Sentence used when no scoring rule fired.
const NO_FACTORS: &str = "No notable congestion factors for this route and time.";

/// Generic fallback when a triggered rule has no template in the document.
const TEMPLATE_FALLBACK: &str = "A standard congestion adjustment applied to this route.";

/// Short explanations pick the most significant rule first.
const PRIORITY: [RuleKey; 4] = [
    RuleKey::Hotspot,
    RuleKey::ItCorridor,
    RuleKey::Peak,
    RuleKey::Weekend,
];

/// Short and detailed renderings for one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub short: String,
    pub detailed: String,
}

/// Stateless explanation renderer.
pub struct ReasoningEngine;

impl ReasoningEngine {
    /// Render the short (highest-priority rule) and detailed (every rule in
    /// application order, one per line) explanations.
    pub fn explain(result: &CongestionResult, templates: &ExplanationTemplates) -> Explanation {
        if result.triggered_rules.contains(&RuleKey::UnknownArea) {
            return Explanation {
                short: DATASET_MISS_MESSAGE.to_string(),
                detailed: DATASET_MISS_MESSAGE.to_string(),
            };
        }
        if result.triggered_rules.is_empty() {
            return Explanation {
                short: NO_FACTORS.to_string(),
                detailed: NO_FACTORS.to_string(),
            };
        }

        let short = PRIORITY
            .iter()
            .find(|key| result.triggered_rules.contains(key))
            .map(|key| render(templates, *key))
            .unwrap_or_else(|| NO_FACTORS.to_string());

        let detailed = result
            .triggered_rules
            .iter()
            .map(|key| render(templates, *key))
            .collect::<Vec<_>>()
            .join("\n");

        Explanation { short, detailed }
    }

    /// Fixed-shape prompt requesting the four fields needed to add an area,
    /// independent of whether the area already exists.
    pub fn suggest_area_addition(name: &str) -> String {
        format!(
            "{DATASET_MISS_MESSAGE}. To add '{}', provide: area name, zone tag, \
             nearby landmark, and hotspot status (yes/no).",
            name.trim()
        )
    }
}

fn render(templates: &ExplanationTemplates, key: RuleKey) -> String {
    templates
        .get(&key)
        .cloned()
        .unwrap_or_else(|| TEMPLATE_FALLBACK.to_string())
}

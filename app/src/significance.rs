// ==============================================================================
// significance.rs - Clinical Significance Vocabulary Mapping
// ==============================================================================
// Description: Normalises free-text CIViC significance into the CLNSIG vocabulary
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Rules are evaluated in order, first match wins. Rule 1 matches any text
// containing "pathogenic", so rule 2 ("likely" + "pathogenic") is never
// reached; likewise rule 3 shadows rule 4. "Likely Pathogenic" therefore
// maps to Pathogenic.
// ==============================================================================

use crate::models::ClinicalSignificance;

/// A single classification rule over lower-cased text
struct Rule {
    matches: fn(&str) -> bool,
    outcome: ClinicalSignificance,
}

fn is_pathogenic(s: &str) -> bool {
    s.contains("pathogenic") || s.contains("oncogenic") || s.contains("sensitiv")
}

fn is_likely_pathogenic(s: &str) -> bool {
    s.contains("likely") && s.contains("pathogenic")
}

fn is_benign(s: &str) -> bool {
    s.contains("benign") || s.contains("neutral")
}

fn is_likely_benign(s: &str) -> bool {
    s.contains("likely") && s.contains("benign")
}

const RULES: [Rule; 4] = [
    Rule { matches: is_pathogenic, outcome: ClinicalSignificance::Pathogenic },
    Rule { matches: is_likely_pathogenic, outcome: ClinicalSignificance::LikelyPathogenic },
    Rule { matches: is_benign, outcome: ClinicalSignificance::Benign },
    Rule { matches: is_likely_benign, outcome: ClinicalSignificance::LikelyBenign },
];

/// Map a raw significance string (or its absence) to the CLNSIG vocabulary
pub fn map_significance(raw: Option<&str>) -> ClinicalSignificance {
    let Some(raw) = raw else {
        return ClinicalSignificance::Vus;
    };

    let lower = raw.to_lowercase();
    RULES
        .iter()
        .find(|rule| (rule.matches)(&lower))
        .map(|rule| rule.outcome)
        .unwrap_or(ClinicalSignificance::Vus)
}

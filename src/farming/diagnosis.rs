//! Symptom-based crop problem diagnosis

use serde::{Deserialize, Serialize};

/// Diagnosis confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisConfidence {
    Medium,
    Low,
}

/// Possible causes and remedies for a set of symptoms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    #[serde(default)]
    pub possible_diseases: Vec<String>,
    #[serde(default)]
    pub possible_pests: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl Diagnosis {
    /// Medium when any disease or pest matched, low otherwise
    #[must_use]
    pub fn confidence(&self) -> DiagnosisConfidence {
        if self.possible_diseases.is_empty() && self.possible_pests.is_empty() {
            DiagnosisConfidence::Low
        } else {
            DiagnosisConfidence::Medium
        }
    }
}

enum Finding {
    Diseases,
    Pests,
}

struct SymptomRule {
    triggers: &'static [&'static str],
    finding: Finding,
    causes: [&'static str; 3],
    remedies: [&'static str; 3],
}

const RULES: &[SymptomRule] = &[
    SymptomRule {
        triggers: &["yellow", "yellowing"],
        finding: Finding::Diseases,
        causes: ["Nutrient deficiency (Nitrogen)", "Viral infection", "Root rot"],
        remedies: ["Apply balanced fertilizer", "Improve drainage", "Test soil pH"],
    },
    SymptomRule {
        triggers: &["spots", "lesions"],
        finding: Finding::Diseases,
        causes: ["Leaf spot disease", "Fungal infection", "Bacterial blight"],
        remedies: [
            "Apply fungicide spray",
            "Remove affected leaves",
            "Improve air circulation",
        ],
    },
    SymptomRule {
        triggers: &["holes", "eaten"],
        finding: Finding::Pests,
        causes: ["Caterpillars", "Beetles", "Grasshoppers"],
        remedies: [
            "Use neem oil spray",
            "Install pheromone traps",
            "Introduce beneficial insects",
        ],
    },
    SymptomRule {
        triggers: &["wilting", "drooping"],
        finding: Finding::Diseases,
        causes: ["Wilt disease", "Root damage", "Water stress"],
        remedies: [
            "Check irrigation schedule",
            "Inspect root system",
            "Apply organic matter",
        ],
    },
];

/// Diagnose free-text symptoms; every matching rule contributes
#[must_use]
pub fn diagnose_symptoms(symptoms: &str) -> Diagnosis {
    let lower = symptoms.to_lowercase();
    let mut diagnosis = Diagnosis::default();

    for rule in RULES {
        if !rule.triggers.iter().any(|t| lower.contains(t)) {
            continue;
        }

        let target = match rule.finding {
            Finding::Diseases => &mut diagnosis.possible_diseases,
            Finding::Pests => &mut diagnosis.possible_pests,
        };
        target.extend(rule.causes.iter().map(ToString::to_string));
        diagnosis
            .recommendations
            .extend(rule.remedies.iter().map(ToString::to_string));
    }

    diagnosis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yellow_leaves() {
        let d = diagnose_symptoms("Leaves are Yellowing fast");
        assert_eq!(d.possible_diseases.len(), 3);
        assert!(d.possible_pests.is_empty());
        assert_eq!(d.recommendations[0], "Apply balanced fertilizer");
        assert_eq!(d.confidence(), DiagnosisConfidence::Medium);
    }

    #[test]
    fn test_rules_accumulate() {
        let d = diagnose_symptoms("holes in leaves and brown spots, plant drooping");
        assert_eq!(d.possible_pests, ["Caterpillars", "Beetles", "Grasshoppers"]);
        assert_eq!(d.possible_diseases.len(), 6);
        assert_eq!(d.recommendations.len(), 9);
    }

    #[test]
    fn test_no_match_is_low_confidence() {
        let d = diagnose_symptoms("looks fine to me");
        assert_eq!(d, Diagnosis::default());
        assert_eq!(d.confidence(), DiagnosisConfidence::Low);
    }
}

//! Canned diagnoses served when no detection provider is available

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How badly the plant is affected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Healthy,
}

impl Severity {
    /// Severity implied by a disease probability in `[0, 1]`
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            Self::Mild
        } else if probability < 0.6 {
            Self::Moderate
        } else {
            Self::Severe
        }
    }
}

/// What the image analysis saw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub affected_area: String,
    pub plant_parts: Vec<String>,
    pub health_score: u8,
}

/// Result of analysing a plant image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseDetection {
    pub success: bool,
    pub disease_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    /// Percent, 0-100
    pub confidence: u8,
    pub severity: Severity,
    pub description: String,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organic_remedies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_yield_impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<ImageAnalysis>,
    /// Free-text answer from a language-model provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub api_source: String,
}

/// Source label for canned results
pub const DUMMY_SOURCE: &str = "dummy_api";

/// Key of the entry used for healthy plants and unknown keys
pub const HEALTHY_KEY: &str = "healthy";

/// A catalogue entry
#[derive(Debug)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub disease_name: &'static str,
    pub scientific_name: &'static str,
    pub confidence: u8,
    pub severity: Severity,
    pub description: &'static str,
    pub symptoms: &'static [&'static str],
    pub treatment: &'static [&'static str],
    pub prevention: &'static [&'static str],
    pub organic_remedies: &'static [&'static str],
    pub estimated_yield_impact: &'static str,
    pub affected_area: &'static str,
    pub plant_parts: &'static [&'static str],
    pub health_score: u8,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl CatalogEntry {
    /// Materialize the entry as a detection attributed to `api_source`
    #[must_use]
    pub fn to_detection(&self, api_source: &str) -> DiseaseDetection {
        DiseaseDetection {
            success: true,
            disease_name: self.disease_name.to_string(),
            scientific_name: Some(self.scientific_name.to_string()),
            confidence: self.confidence,
            severity: self.severity,
            description: self.description.to_string(),
            symptoms: owned(self.symptoms),
            treatment: owned(self.treatment),
            prevention: owned(self.prevention),
            organic_remedies: Some(owned(self.organic_remedies)),
            estimated_yield_impact: Some(self.estimated_yield_impact.to_string()),
            image_analysis: Some(ImageAnalysis {
                affected_area: self.affected_area.to_string(),
                plant_parts: owned(self.plant_parts),
                health_score: self.health_score,
            }),
            diagnosis: None,
            timestamp: Utc::now(),
            api_source: api_source.to_string(),
        }
    }
}

pub static CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        key: "late_blight",
        disease_name: "Late Blight",
        scientific_name: "Phytophthora infestans",
        confidence: 89,
        severity: Severity::Severe,
        description: "Late blight is a serious disease affecting potato and tomato crops. It spreads rapidly in cool, wet conditions and can destroy entire crops within days if not treated.",
        symptoms: &[
            "Dark, water-soaked lesions on leaves",
            "White fungal growth on leaf undersides",
            "Brown-black spots on stems",
            "Soft, dark rot on tubers/fruits",
            "Rapid wilting and plant death",
        ],
        treatment: &[
            "Apply copper-based fungicide immediately (e.g., Bordeaux mixture)",
            "Remove and destroy infected plant parts",
            "Spray Mancozeb or Chlorothalonil every 7-10 days",
            "Improve air circulation by proper spacing",
            "Avoid overhead irrigation",
        ],
        prevention: &[
            "Use certified disease-free seeds and plants",
            "Rotate crops every 2-3 years",
            "Plant resistant varieties when available",
            "Ensure good field drainage",
            "Monitor weather conditions for blight warnings",
        ],
        organic_remedies: &[
            "Neem oil spray (3ml per liter of water)",
            "Baking soda solution (1 tbsp per gallon)",
            "Compost tea foliar application",
        ],
        estimated_yield_impact: "70-100% crop loss if untreated",
        affected_area: "35-45%",
        plant_parts: &["leaves", "stems"],
        health_score: 25,
    },
    CatalogEntry {
        key: "powdery_mildew",
        disease_name: "Powdery Mildew",
        scientific_name: "Erysiphales",
        confidence: 92,
        severity: Severity::Moderate,
        description: "Powdery mildew is a common fungal disease that appears as white powdery spots on leaves and stems. It thrives in warm, dry conditions with high humidity.",
        symptoms: &[
            "White powdery coating on leaf surfaces",
            "Yellow or brown patches on leaves",
            "Distorted or stunted new growth",
            "Premature leaf drop",
            "Reduced fruit quality",
        ],
        treatment: &[
            "Apply sulfur-based fungicide",
            "Use potassium bicarbonate spray",
            "Prune heavily infected areas",
            "Improve air circulation around plants",
            "Apply neem oil as organic treatment",
        ],
        prevention: &[
            "Space plants for adequate airflow",
            "Water at base of plants, not overhead",
            "Choose resistant varieties",
            "Remove and destroy crop debris",
            "Maintain balanced nitrogen levels",
        ],
        organic_remedies: &[
            "Milk spray (40% milk to water ratio)",
            "Baking soda spray (1 tsp per quart of water)",
            "Garlic extract spray",
        ],
        estimated_yield_impact: "20-30% reduction in yield",
        affected_area: "15-25%",
        plant_parts: &["leaves"],
        health_score: 55,
    },
    CatalogEntry {
        key: "bacterial_leaf_spot",
        disease_name: "Bacterial Leaf Spot",
        scientific_name: "Xanthomonas campestris",
        confidence: 85,
        severity: Severity::Moderate,
        description: "Bacterial leaf spot causes dark, water-soaked lesions on leaves that can spread rapidly during warm, wet weather. It affects many vegetable crops.",
        symptoms: &[
            "Small, dark water-soaked spots on leaves",
            "Yellow halos around lesions",
            "Spots may merge causing leaf blight",
            "Fruit lesions with scabby appearance",
            "Defoliation in severe cases",
        ],
        treatment: &[
            "Apply copper-based bactericide",
            "Remove and destroy infected leaves",
            "Avoid working with wet plants",
            "Use drip irrigation instead of overhead",
            "Apply streptomycin sulfate if available",
        ],
        prevention: &[
            "Use disease-free certified seeds",
            "Practice 2-3 year crop rotation",
            "Avoid overhead irrigation",
            "Control insect vectors",
            "Sanitize garden tools regularly",
        ],
        organic_remedies: &[
            "Copper hydroxide organic spray",
            "Bacillus subtilis biological control",
            "Hydrogen peroxide solution (3%)",
        ],
        estimated_yield_impact: "25-40% yield reduction",
        affected_area: "20-30%",
        plant_parts: &["leaves", "fruits"],
        health_score: 45,
    },
    CatalogEntry {
        key: "rust",
        disease_name: "Rust Disease",
        scientific_name: "Puccinia spp.",
        confidence: 91,
        severity: Severity::Moderate,
        description: "Rust is a fungal disease characterized by orange, yellow, or reddish-brown pustules on plant surfaces. It can significantly reduce photosynthesis and crop yield.",
        symptoms: &[
            "Orange-red pustules on leaf undersides",
            "Yellow spots on upper leaf surfaces",
            "Premature leaf yellowing",
            "Reduced plant vigor",
            "Weak stems susceptible to lodging",
        ],
        treatment: &[
            "Apply fungicide containing tebuconazole",
            "Remove heavily infected leaves",
            "Spray sulfur-based fungicide preventively",
            "Apply systemic fungicide for severe cases",
            "Maintain proper plant nutrition",
        ],
        prevention: &[
            "Plant rust-resistant varieties",
            "Avoid excess nitrogen fertilization",
            "Ensure adequate spacing between plants",
            "Remove alternate hosts nearby",
            "Scout regularly for early detection",
        ],
        organic_remedies: &[
            "Sulfur dust application",
            "Neem oil preventive spray",
            "Baking soda solution",
        ],
        estimated_yield_impact: "30-50% yield loss possible",
        affected_area: "25-35%",
        plant_parts: &["leaves", "stems"],
        health_score: 40,
    },
    CatalogEntry {
        key: HEALTHY_KEY,
        disease_name: "Healthy Plant",
        scientific_name: "N/A",
        confidence: 95,
        severity: Severity::Healthy,
        description: "Great news! Your plant appears to be healthy with no visible signs of disease, pest damage, or nutrient deficiencies. The leaves show good color and structure.",
        symptoms: &[
            "Vibrant green leaf color",
            "No visible spots or lesions",
            "Strong stem structure",
            "Normal growth pattern",
            "No wilting or discoloration",
        ],
        treatment: &[
            "Continue current care routine",
            "Maintain regular watering schedule",
            "Monitor for any future changes",
            "Keep implementing preventive measures",
            "Ensure balanced nutrition program",
        ],
        prevention: &[
            "Regular crop monitoring",
            "Proper irrigation management",
            "Balanced fertilizer application",
            "Good field hygiene practices",
            "Integrated pest management",
        ],
        organic_remedies: &[
            "Compost application for soil health",
            "Beneficial insect habitat maintenance",
            "Cover cropping between seasons",
        ],
        estimated_yield_impact: "No negative impact expected",
        affected_area: "0%",
        plant_parts: &[],
        health_score: 95,
    },
    CatalogEntry {
        key: "nutrient_deficiency",
        disease_name: "Nutrient Deficiency",
        scientific_name: "N/A - Abiotic Disorder",
        confidence: 78,
        severity: Severity::Mild,
        description: "The plant shows signs of nutrient deficiency, which can be corrected with proper fertilization. Early detection and treatment can fully restore plant health.",
        symptoms: &[
            "Yellowing of older leaves (nitrogen deficiency)",
            "Purple discoloration (phosphorus deficiency)",
            "Brown leaf edges (potassium deficiency)",
            "Interveinal chlorosis (iron/magnesium)",
            "Stunted or slow growth",
        ],
        treatment: &[
            "Conduct soil test for accurate diagnosis",
            "Apply balanced NPK fertilizer",
            "Use foliar micronutrient spray",
            "Adjust soil pH if necessary",
            "Add organic matter to improve nutrient availability",
        ],
        prevention: &[
            "Regular soil testing (annually)",
            "Balanced fertilization program",
            "Proper soil pH maintenance",
            "Adequate organic matter addition",
            "Avoid over-watering that leaches nutrients",
        ],
        organic_remedies: &[
            "Compost tea application",
            "Fish emulsion fertilizer",
            "Kelp extract foliar spray",
            "Well-rotted manure incorporation",
        ],
        estimated_yield_impact: "10-20% reduction if untreated",
        affected_area: "40-60%",
        plant_parts: &["leaves"],
        health_score: 60,
    },
];

fn entry(key: &str) -> &'static CatalogEntry {
    CATALOG
        .iter()
        .find(|e| e.key == key)
        .or_else(|| CATALOG.iter().find(|e| e.key == HEALTHY_KEY))
        .unwrap_or(&CATALOG[0])
}

/// A uniformly chosen canned result
#[must_use]
pub fn dummy_result<R: Rng>(rng: &mut R) -> DiseaseDetection {
    CATALOG[rng.gen_range(0..CATALOG.len())].to_detection(DUMMY_SOURCE)
}

/// The canned result for `key`; unknown keys get the healthy entry
#[must_use]
pub fn specific_result(key: &str) -> DiseaseDetection {
    entry(key).to_detection(DUMMY_SOURCE)
}

/// The healthy entry attributed to a real provider
#[must_use]
pub fn healthy_result(api_source: &str) -> DiseaseDetection {
    entry(HEALTHY_KEY).to_detection(api_source)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_catalog_keys_are_unique() {
        let mut keys: Vec<_> = CATALOG.iter().map(|e| e.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn test_specific_result() {
        let blight = specific_result("late_blight");
        assert_eq!(blight.disease_name, "Late Blight");
        assert_eq!(blight.severity, Severity::Severe);
        assert_eq!(blight.confidence, 89);
        assert_eq!(blight.api_source, DUMMY_SOURCE);

        let unknown = specific_result("dragon_pox");
        assert_eq!(unknown.severity, Severity::Healthy);
        assert_eq!(unknown.image_analysis.unwrap().health_score, 95);
    }

    #[test]
    fn test_severity_from_probability() {
        assert_eq!(Severity::from_probability(0.1), Severity::Mild);
        assert_eq!(Severity::from_probability(0.3), Severity::Moderate);
        assert_eq!(Severity::from_probability(0.59), Severity::Moderate);
        assert_eq!(Severity::from_probability(0.9), Severity::Severe);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(specific_result("rust")).unwrap();
        assert_eq!(json["diseaseName"], "Rust Disease");
        assert_eq!(json["severity"], "moderate");
        assert_eq!(json["apiSource"], "dummy_api");
        assert_eq!(json["imageAnalysis"]["plantParts"][1], "stems");
        assert!(json.get("diagnosis").is_none());
    }

    proptest! {
        #[test]
        fn prop_dummy_result_is_well_formed(seed in any::<u64>()) {
            let result = dummy_result(&mut StdRng::seed_from_u64(seed));
            prop_assert!(result.success);
            prop_assert!(result.confidence <= 100);
            prop_assert!(matches!(
                result.severity,
                Severity::Mild | Severity::Moderate | Severity::Severe | Severity::Healthy
            ));
            prop_assert_eq!(result.api_source, DUMMY_SOURCE);
        }
    }
}

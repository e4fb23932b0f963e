//! Common diseases and growing conditions per crop

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptimalConditions {
    pub temperature: &'static str,
    pub humidity: &'static str,
    pub soil: &'static str,
}

/// Disease reference for one crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropDiseaseInfo {
    pub crop_name: &'static str,
    pub common_diseases: &'static [&'static str],
    pub growing_season: &'static str,
    pub optimal_conditions: OptimalConditions,
}

static CROPS: &[CropDiseaseInfo] = &[
    CropDiseaseInfo {
        crop_name: "Tomato",
        common_diseases: &["Late Blight", "Early Blight", "Septoria Leaf Spot", "Bacterial Spot"],
        growing_season: "Spring to Fall (March-October)",
        optimal_conditions: OptimalConditions {
            temperature: "21-27°C (70-80°F)",
            humidity: "65-75%",
            soil: "Well-drained, pH 6.0-6.8",
        },
    },
    CropDiseaseInfo {
        crop_name: "Potato",
        common_diseases: &["Late Blight", "Early Blight", "Black Scurf", "Common Scab"],
        growing_season: "Spring (March-May planting)",
        optimal_conditions: OptimalConditions {
            temperature: "15-20°C (59-68°F)",
            humidity: "80-90%",
            soil: "Sandy loam, pH 5.5-6.5",
        },
    },
    CropDiseaseInfo {
        crop_name: "Wheat",
        common_diseases: &["Rust", "Powdery Mildew", "Septoria", "Fusarium Head Blight"],
        growing_season: "Winter wheat (Fall), Spring wheat (Spring)",
        optimal_conditions: OptimalConditions {
            temperature: "10-24°C (50-75°F)",
            humidity: "50-70%",
            soil: "Clay loam, pH 6.0-7.0",
        },
    },
    CropDiseaseInfo {
        crop_name: "Rice",
        common_diseases: &["Blast", "Brown Spot", "Bacterial Leaf Blight", "Sheath Blight"],
        growing_season: "Monsoon season (June-November)",
        optimal_conditions: OptimalConditions {
            temperature: "20-35°C (68-95°F)",
            humidity: "80-90%",
            soil: "Clay or clay loam, pH 5.5-6.5",
        },
    },
];

/// Look up a crop by name, case-insensitively
#[must_use]
pub fn crop_disease_info(crop: &str) -> Option<&'static CropDiseaseInfo> {
    let crop = crop.trim();
    CROPS.iter().find(|c| c.crop_name.eq_ignore_ascii_case(crop))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let info = crop_disease_info(" WHEAT ").unwrap();
        assert_eq!(info.crop_name, "Wheat");
        assert!(info.common_diseases.contains(&"Rust"));
    }

    #[test]
    fn test_unknown_crop() {
        assert!(crop_disease_info("mango").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(crop_disease_info("rice").unwrap()).unwrap();
        assert_eq!(json["cropName"], "Rice");
        assert_eq!(json["optimalConditions"]["humidity"], "80-90%");
    }
}

//! Crop recommendations

use serde::{Deserialize, Serialize};

/// Request body for crop recommendations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_size: Option<f64>,
}

/// A recommended crop with economics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendation {
    pub crop: String,
    pub suitability: u8,
    #[serde(default)]
    pub reasons: Vec<String>,
    pub planting_time: String,
    pub expected_yield: String,
    pub market_price: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,
}

struct CropProfile {
    crop: &'static str,
    suitability: u8,
    reasons: [&'static str; 3],
    planting_time: &'static str,
    expected_yield: &'static str,
    market_price: u32,
    investment: u32,
    profit: u32,
    roi: f64,
    min_land_size: f64,
}

const PROFILES: &[CropProfile] = &[
    CropProfile {
        crop: "Rice",
        suitability: 85,
        reasons: ["High water availability", "Suitable soil pH", "Good market demand"],
        planting_time: "June-July",
        expected_yield: "4-6 tons/hectare",
        market_price: 2500,
        investment: 45000,
        profit: 65000,
        roi: 44.4,
        min_land_size: 2.0,
    },
    CropProfile {
        crop: "Wheat",
        suitability: 75,
        reasons: ["Good winter crop", "Stable market prices", "Low water requirement"],
        planting_time: "November-December",
        expected_yield: "3-4 tons/hectare",
        market_price: 2200,
        investment: 35000,
        profit: 48000,
        roi: 37.1,
        min_land_size: 0.0,
    },
    CropProfile {
        crop: "Maize",
        suitability: 70,
        reasons: ["Fast growing", "Multiple uses", "Good for rotation"],
        planting_time: "March-April",
        expected_yield: "5-7 tons/hectare",
        market_price: 1800,
        investment: 30000,
        profit: 42000,
        roi: 40.0,
        min_land_size: 0.0,
    },
];

/// Recommend crops for a plot, most suitable first
///
/// Rice needs at least 2 units of land; smaller known plots drop it. A size
/// of zero counts as not specified.
#[must_use]
pub fn recommend_crops(land_size: Option<f64>) -> Vec<CropRecommendation> {
    PROFILES
        .iter()
        .filter(|p| {
            land_size.is_none_or(|size| size == 0.0 || size.is_nan() || size >= p.min_land_size)
        })
        .map(|p| CropRecommendation {
            crop: p.crop.to_string(),
            suitability: p.suitability,
            reasons: p.reasons.iter().map(ToString::to_string).collect(),
            planting_time: p.planting_time.to_string(),
            expected_yield: p.expected_yield.to_string(),
            market_price: p.market_price,
            investment: Some(p.investment),
            profit: Some(p.profit),
            roi: Some(p.roi),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_land_size_keeps_all() {
        let recs = recommend_crops(None);
        let crops: Vec<_> = recs.iter().map(|r| r.crop.as_str()).collect();
        assert_eq!(crops, ["Rice", "Wheat", "Maize"]);
        assert!(recs.windows(2).all(|w| w[0].suitability >= w[1].suitability));
    }

    #[test]
    fn test_small_plot_drops_rice() {
        let recs = recommend_crops(Some(1.5));
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.crop != "Rice"));
    }

    #[test]
    fn test_zero_land_size_is_unspecified() {
        assert_eq!(recommend_crops(Some(0.0)).len(), 3);
    }

    #[test]
    fn test_negative_land_size_drops_rice() {
        let recs = recommend_crops(Some(-1.0));
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.crop != "Rice"));
    }

    #[test]
    fn test_large_plot_keeps_rice() {
        assert_eq!(recommend_crops(Some(2.0)).len(), 3);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(&recommend_crops(None)[0]).unwrap();
        assert_eq!(json["plantingTime"], "June-July");
        assert_eq!(json["marketPrice"], 2500);
        assert_eq!(json["roi"], 44.4);
    }
}

//! USDA-style soil texture classes and soil recommendations

use serde::{Deserialize, Serialize};

/// Soil texture class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureClass {
    Sand,
    #[serde(rename = "Loamy Sand")]
    LoamySand,
    #[serde(rename = "Sandy Loam")]
    SandyLoam,
    #[serde(rename = "Silt Loam")]
    SiltLoam,
    Silt,
    #[serde(rename = "Clay Loam")]
    ClayLoam,
    #[serde(rename = "Sandy Clay Loam")]
    SandyClayLoam,
    #[serde(rename = "Silty Clay Loam")]
    SiltyClayLoam,
    #[serde(rename = "Sandy Clay")]
    SandyClay,
    #[serde(rename = "Silty Clay")]
    SiltyClay,
    Clay,
    Loam,
}

impl TextureClass {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sand => "Sand",
            Self::LoamySand => "Loamy Sand",
            Self::SandyLoam => "Sandy Loam",
            Self::SiltLoam => "Silt Loam",
            Self::Silt => "Silt",
            Self::ClayLoam => "Clay Loam",
            Self::SandyClayLoam => "Sandy Clay Loam",
            Self::SiltyClayLoam => "Silty Clay Loam",
            Self::SandyClay => "Sandy Clay",
            Self::SiltyClay => "Silty Clay",
            Self::Clay => "Clay",
            Self::Loam => "Loam",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Sand => "Very coarse-textured soil with excellent drainage",
            Self::LoamySand => "Coarse-textured soil with good drainage",
            Self::SandyLoam => "Well-draining soil, good for many crops",
            Self::SiltLoam => "Fertile soil with good water retention",
            Self::Silt => "Fine-textured soil with high water retention",
            Self::ClayLoam => "Heavy soil with excellent nutrient retention",
            Self::SandyClayLoam => "Moderately heavy soil with good structure",
            Self::SiltyClayLoam => "Heavy soil with high fertility potential",
            Self::SandyClay => "Heavy soil with drainage challenges",
            Self::SiltyClay => "Very heavy soil with water retention issues",
            Self::Clay => "Very heavy soil requiring careful management",
            Self::Loam => "Well-balanced soil ideal for most crops",
        }
    }
}

/// Texture class with its description, as reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoilTexture {
    #[serde(rename = "type")]
    pub class: TextureClass,
    pub description: &'static str,
}

impl From<TextureClass> for SoilTexture {
    fn from(class: TextureClass) -> Self {
        Self {
            class,
            description: class.description(),
        }
    }
}

/// Scale clay/sand/silt so they sum to 100; `None` when the total is not positive
#[must_use]
pub fn normalize(clay: f64, sand: f64, silt: f64) -> Option<(f64, f64, f64)> {
    let total = clay + sand + silt;
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    Some((clay / total * 100.0, sand / total * 100.0, silt / total * 100.0))
}

/// Classify a texture from clay/sand/silt percentages
///
/// Rules are evaluated in order on the normalized fractions; the first match
/// wins and anything unmatched (including an all-zero sample) is Loam.
#[must_use]
pub fn classify_soil_texture(clay: f64, sand: f64, silt: f64) -> SoilTexture {
    let Some((clay, sand, silt)) = normalize(clay, sand, silt) else {
        return TextureClass::Loam.into();
    };

    let class = if sand >= 85.0 && clay <= 10.0 {
        TextureClass::Sand
    } else if (70.0..85.0).contains(&sand) && clay <= 15.0 {
        TextureClass::LoamySand
    } else if (43.0..85.0).contains(&sand) && clay <= 20.0 {
        TextureClass::SandyLoam
    } else if silt >= 50.0 && (12.0..27.0).contains(&clay) {
        TextureClass::SiltLoam
    } else if silt >= 80.0 && clay < 12.0 {
        TextureClass::Silt
    } else if (20.0..=45.0).contains(&sand) && (27.0..40.0).contains(&clay) {
        TextureClass::ClayLoam
    } else if sand >= 45.0 && (20.0..35.0).contains(&clay) {
        TextureClass::SandyClayLoam
    } else if silt >= 28.0 && clay >= 40.0 {
        TextureClass::SiltyClayLoam
    } else if sand >= 45.0 && clay >= 35.0 {
        TextureClass::SandyClay
    } else if silt >= 40.0 && clay >= 40.0 {
        TextureClass::SiltyClay
    } else if clay >= 40.0 {
        TextureClass::Clay
    } else {
        TextureClass::Loam
    };

    class.into()
}

/// Management advice from texture, pH, and organic carbon (%)
#[must_use]
pub fn soil_recommendations(
    class: TextureClass,
    ph: Option<f64>,
    organic_carbon: Option<f64>,
) -> Vec<String> {
    let mut recs: Vec<&str> = match class {
        TextureClass::Sand => vec![
            "Improve water retention with organic matter",
            "Consider drip irrigation for water efficiency",
            "Add compost regularly to increase nutrient retention",
        ],
        TextureClass::Clay => vec![
            "Improve drainage with raised beds or tile drainage",
            "Add organic matter to improve soil structure",
            "Avoid working soil when wet to prevent compaction",
        ],
        TextureClass::Loam => vec![
            "Excellent soil for most crops",
            "Maintain organic matter levels with cover crops",
        ],
        _ => vec!["Monitor soil moisture levels regularly"],
    };

    if let Some(ph) = ph {
        recs.push(if ph < 6.0 {
            "Consider liming to raise soil pH for better nutrient availability"
        } else if ph > 8.0 {
            "Consider sulfur application to lower pH"
        } else {
            "pH levels are suitable for most crops"
        });
    }

    if let Some(oc) = organic_carbon {
        if oc < 1.0 {
            recs.push("Increase organic matter with compost or cover crops");
        } else if oc > 3.0 {
            recs.push("Excellent organic matter levels - maintain current practices");
        }
    }

    recs.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn class(clay: f64, sand: f64, silt: f64) -> TextureClass {
        classify_soil_texture(clay, sand, silt).class
    }

    #[test]
    fn test_reference_samples() {
        assert_eq!(class(5.0, 90.0, 5.0), TextureClass::Sand);
        assert_eq!(class(10.0, 75.0, 15.0), TextureClass::LoamySand);
        assert_eq!(class(15.0, 60.0, 25.0), TextureClass::SandyLoam);
        assert_eq!(class(20.0, 20.0, 60.0), TextureClass::SiltLoam);
        assert_eq!(class(5.0, 5.0, 90.0), TextureClass::Silt);
        assert_eq!(class(30.0, 35.0, 35.0), TextureClass::ClayLoam);
        assert_eq!(class(25.0, 55.0, 20.0), TextureClass::SandyClayLoam);
        assert_eq!(class(40.0, 30.0, 30.0), TextureClass::SiltyClayLoam);
        assert_eq!(class(40.0, 50.0, 10.0), TextureClass::SandyClay);
        assert_eq!(class(60.0, 20.0, 20.0), TextureClass::Clay);
        assert_eq!(class(20.0, 40.0, 40.0), TextureClass::Loam);
    }

    #[test]
    fn test_inputs_are_normalized() {
        // Same proportions as 40/30/30 expressed in g/kg
        assert_eq!(class(400.0, 300.0, 300.0), TextureClass::SiltyClayLoam);
    }

    #[test]
    fn test_zero_total_is_loam() {
        assert_eq!(class(0.0, 0.0, 0.0), TextureClass::Loam);
        assert!(normalize(0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_serializes_type_and_description() {
        let json = serde_json::to_value(classify_soil_texture(40.0, 30.0, 30.0)).unwrap();
        assert_eq!(json["type"], "Silty Clay Loam");
        assert_eq!(json["description"], "Heavy soil with high fertility potential");
    }

    #[test]
    fn test_recommendations() {
        let recs = soil_recommendations(TextureClass::Clay, Some(5.5), Some(0.5));
        assert_eq!(recs.len(), 5);
        assert!(recs[3].starts_with("Consider liming"));
        assert!(recs[4].starts_with("Increase organic matter"));

        let recs = soil_recommendations(TextureClass::SiltLoam, Some(8.5), Some(3.5));
        assert_eq!(
            recs,
            [
                "Monitor soil moisture levels regularly",
                "Consider sulfur application to lower pH",
                "Excellent organic matter levels - maintain current practices",
            ]
        );

        assert_eq!(soil_recommendations(TextureClass::Loam, None, Some(2.0)).len(), 2);
    }

    proptest! {
        #[test]
        fn prop_classification_is_deterministic(
            clay in 0.0f64..1000.0,
            sand in 0.0f64..1000.0,
            silt in 0.0f64..1000.0,
        ) {
            prop_assert_eq!(
                classify_soil_texture(clay, sand, silt),
                classify_soil_texture(clay, sand, silt)
            );
        }

        #[test]
        fn prop_normalized_sums_to_hundred(
            clay in 0.0f64..1000.0,
            sand in 0.0f64..1000.0,
            silt in 0.001f64..1000.0,
        ) {
            let (c, s, t) = normalize(clay, sand, silt).unwrap();
            prop_assert!((c + s + t - 100.0).abs() < 1e-9);
        }
    }
}

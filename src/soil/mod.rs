//! Soil information from ISRIC SoilGrids
//!
//! Topsoil (0-5 cm) texture and chemistry for a coordinate, classified into a
//! USDA-style texture class with management advice. Points SoilGrids cannot
//! describe get a regional estimate flagged with `is_simulated`.

mod grids;
mod regional;
pub mod texture;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::SoilSnapshot;
use crate::{Error, Result};

pub use grids::{SOIL_CACHE_TTL, SoilGridsClient};
pub use regional::{RegionalEstimate, regional_estimate};
pub use texture::{SoilTexture, TextureClass, classify_soil_texture, soil_recommendations};

/// Queried point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Texture fractions in percent plus their class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextureReport {
    pub clay_percentage: f64,
    pub sand_percentage: f64,
    pub silt_percentage: f64,
    pub classification: SoilTexture,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChemicalProperties {
    pub ph: Option<f64>,
    pub organic_carbon_percentage: Option<f64>,
}

/// Values exactly as SoilGrids reported them
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawValues {
    pub clay_g_kg: Option<f64>,
    pub sand_g_kg: Option<f64>,
    pub silt_g_kg: Option<f64>,
    pub ph_h2o_x10: Option<f64>,
    pub organic_carbon_dg_kg: Option<f64>,
}

/// Soil lookup result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilReport {
    pub coordinates: Coordinates,
    pub texture: TextureReport,
    pub chemical_properties: ChemicalProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_values: Option<RawValues>,
    pub recommendations: Vec<String>,
    pub data_source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<&'static str>,
    pub is_simulated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    pub fetched_at: DateTime<Utc>,
}

impl From<&SoilReport> for SoilSnapshot {
    fn from(report: &SoilReport) -> Self {
        let class = report.texture.classification;
        Self {
            clay: Some(report.texture.clay_percentage),
            sand: Some(report.texture.sand_percentage),
            silt: Some(report.texture.silt_percentage),
            ph: report.chemical_properties.ph,
            organic_carbon: report.chemical_properties.organic_carbon_percentage,
            soil_type: Some(class.class.name().to_string()),
            soil_description: Some(class.description.to_string()),
            texture_class: Some(class.class.name().to_string()),
            recommendations: report.recommendations.clone(),
            source: Some(report.data_source.to_string()),
            fetched_at: Some(report.fetched_at.to_rfc3339()),
            is_simulated: Some(report.is_simulated),
        }
    }
}

/// Check that a coordinate pair is on the globe
///
/// # Errors
///
/// Returns `Error::Validation` for out-of-range or non-finite values
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(Error::Validation(
            "Invalid latitude or longitude values".to_string(),
        ));
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(Error::Validation(
            "Latitude must be between -90 and 90, longitude between -180 and 180".to_string(),
        ));
    }
    Ok(())
}

/// Parse and validate raw `lat`/`lon` query values
///
/// # Errors
///
/// Returns `Error::Validation` when either value is missing, unparsable, or
/// out of range
pub fn parse_coordinates(lat: Option<&str>, lon: Option<&str>) -> Result<(f64, f64)> {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Err(Error::Validation(
            "Missing required parameters: latitude and longitude".to_string(),
        ));
    };

    let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) else {
        return Err(Error::Validation(
            "Invalid latitude or longitude values".to_string(),
        ));
    };

    validate_coordinates(lat, lon)?;
    Ok((lat, lon))
}

//! Plant disease detection
//!
//! Images go through a chain of providers (Plant.id, Susya, Gemini). The
//! first answer wins; with no provider configured, or when all of them fail,
//! a canned diagnosis from the catalogue is returned instead.

pub mod catalog;
mod crops;
mod detect;
pub mod parse;

pub use catalog::{
    CATALOG, DUMMY_SOURCE, DiseaseDetection, ImageAnalysis, Severity, dummy_result,
    specific_result,
};
pub use crops::{CropDiseaseInfo, OptimalConditions, crop_disease_info};
pub use detect::{DiseaseDetector, transform_plant_id};
pub use parse::{TextDiagnosis, parse_provider_response};

//! ISRIC SoilGrids v2.0 client

use std::time::Duration;

use chrono::Utc;
use mini_moka::sync::Cache;
use reqwest::Client;
use serde_json::Value;

use super::{
    ChemicalProperties, Coordinates, RawValues, SoilReport, TextureReport, classify_soil_texture,
    regional_estimate, soil_recommendations, validate_coordinates,
};
use crate::Result;

/// How long a soil lookup stays cached
pub const SOIL_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

const DEPTH: &str = "0-5cm";
const USER_AGENT: &str = concat!("agromitra/", env!("CARGO_PKG_VERSION"));

/// SoilGrids REST client with a per-coordinate cache
#[derive(Clone)]
pub struct SoilGridsClient {
    client: Client,
    base_url: String,
    cache: Cache<String, SoilReport>,
}

impl std::fmt::Debug for SoilGridsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoilGridsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SoilGridsClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: Cache::builder()
                .max_capacity(1024)
                .time_to_live(SOIL_CACHE_TTL)
                .build(),
        }
    }

    /// Soil report for a coordinate
    ///
    /// Properties are fetched concurrently. A failed property is logged and
    /// treated as missing; missing texture data switches to a regional
    /// estimate. Only measured reports are cached.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for out-of-range coordinates
    pub async fn report(&self, lat: f64, lon: f64) -> Result<SoilReport> {
        validate_coordinates(lat, lon)?;

        let cache_key = format!("{lat:.4},{lon:.4}");
        if let Some(report) = self.cache.get(&cache_key) {
            tracing::debug!(lat, lon, "soil cache hit");
            return Ok(report);
        }

        let (clay, sand, silt, ph, ocd) = tokio::join!(
            self.property(lat, lon, "clay"),
            self.property(lat, lon, "sand"),
            self.property(lat, lon, "silt"),
            self.property(lat, lon, "phh2o"),
            self.property(lat, lon, "ocd"),
        );

        let report = if let (Some(clay), Some(sand), Some(silt)) = (clay, sand, silt) {
            let raw = RawValues {
                clay_g_kg: Some(clay),
                sand_g_kg: Some(sand),
                silt_g_kg: Some(silt),
                ph_h2o_x10: ph,
                organic_carbon_dg_kg: ocd,
            };
            tracing::info!(lat, lon, "fetched soilgrids data");
            measured_report(lat, lon, raw)
        } else {
            tracing::warn!(lat, lon, "soilgrids has no texture data, using regional estimate");
            estimated_report(lat, lon)
        };

        if !report.is_simulated {
            self.cache.insert(cache_key, report.clone());
        }
        Ok(report)
    }

    async fn property(&self, lat: f64, lon: f64, property: &str) -> Option<f64> {
        match self.fetch_property(lat, lon, property).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(property, error = %e, "soilgrids property fetch failed");
                None
            }
        }
    }

    async fn fetch_property(&self, lat: f64, lon: f64, property: &str) -> Result<Option<f64>> {
        let url = format!("{}/properties/query", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("property", property.to_string()),
                ("depth", DEPTH.to_string()),
                ("value", "mean".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::Upstream(format!(
                "SoilGrids error: {status} - {body}"
            )));
        }

        let body: Value = response.json().await?;
        Ok(extract_mean(&body, property))
    }
}

/// Pull the 0-5 cm mean for `property` out of a SoilGrids response
///
/// Accepts the `properties.layers[]` shape the live service returns and the
/// older `properties.<name>` keyed shape.
fn extract_mean(body: &Value, property: &str) -> Option<f64> {
    let properties = body.get("properties")?;

    let depths = properties
        .get("layers")
        .and_then(Value::as_array)
        .and_then(|layers| {
            layers
                .iter()
                .find(|layer| layer.get("name").and_then(Value::as_str) == Some(property))
        })
        .or_else(|| properties.get(property))?
        .get("depths")?
        .as_array()?;

    depths
        .iter()
        .find(|d| d.get("label").and_then(Value::as_str) == Some(DEPTH))?
        .get("values")?
        .get("mean")?
        .as_f64()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn measured_report(lat: f64, lon: f64, raw: RawValues) -> SoilReport {
    let clay = raw.clay_g_kg.unwrap_or_default() / 10.0;
    let sand = raw.sand_g_kg.unwrap_or_default() / 10.0;
    let silt = raw.silt_g_kg.unwrap_or_default() / 10.0;
    let ph = raw.ph_h2o_x10.map(|v| round2(v / 10.0));
    let organic_carbon = raw.organic_carbon_dg_kg.map(|v| round2(v / 100.0));

    let classification = classify_soil_texture(clay, sand, silt);

    SoilReport {
        coordinates: Coordinates { lat, lon },
        texture: TextureReport {
            clay_percentage: round2(clay),
            sand_percentage: round2(sand),
            silt_percentage: round2(silt),
            classification,
        },
        chemical_properties: ChemicalProperties {
            ph,
            organic_carbon_percentage: organic_carbon,
        },
        raw_values: Some(raw),
        recommendations: soil_recommendations(classification.class, ph, organic_carbon),
        data_source: "ISRIC SoilGrids v2.0",
        depth: Some("0-5cm (topsoil)"),
        is_simulated: false,
        note: None,
        fetched_at: Utc::now(),
    }
}

fn estimated_report(lat: f64, lon: f64) -> SoilReport {
    let est = regional_estimate(lat, lon, &mut rand::thread_rng());
    let classification = classify_soil_texture(est.clay, est.sand, est.silt);

    SoilReport {
        coordinates: Coordinates { lat, lon },
        texture: TextureReport {
            clay_percentage: est.clay,
            sand_percentage: est.sand,
            silt_percentage: est.silt,
            classification,
        },
        chemical_properties: ChemicalProperties {
            ph: Some(est.ph),
            organic_carbon_percentage: Some(est.organic_carbon),
        },
        raw_values: None,
        recommendations: soil_recommendations(
            classification.class,
            Some(est.ph),
            Some(est.organic_carbon),
        ),
        data_source: "Regional estimates (ISRIC data unavailable)",
        depth: None,
        is_simulated: true,
        note: Some(
            "ISRIC SoilGrids data not available for this location. Values are regional estimates.",
        ),
        fetched_at: Utc::now(),
    }
}

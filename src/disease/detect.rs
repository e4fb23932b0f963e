//! Provider chain for image-based disease detection

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use super::catalog::{DiseaseDetection, Severity, dummy_result, healthy_result};
use super::parse::{TextDiagnosis, parse_provider_response};
use crate::config::{ApiKeys, UpstreamConfig};
use crate::{Error, Result};

const SUSYA_TIMEOUT: Duration = Duration::from_secs(30);
const GEMINI_MODEL: &str = "gemini-1.5-flash";
const USER_AGENT: &str = concat!("agromitra/", env!("CARGO_PKG_VERSION"));

const GEMINI_PROMPT: &str = "You are an expert agricultural specialist analyzing this plant/crop image for diseases and health issues.

Please analyze the image and provide:
1. Disease Identification: Identify any diseases, pests, or health issues visible
2. Severity Assessment: Rate the severity (Mild/Moderate/Severe)
3. Affected Parts: Which parts of the plant are affected
4. Treatment Recommendations: Specific treatments or interventions needed
5. Prevention Measures: How to prevent this issue in the future
6. Confidence Level: Your confidence in the diagnosis (0-100%)

If the plant appears healthy, mention that clearly.
If you cannot identify the plant or see issues clearly, mention the limitations.

Format your response in a clear, farmer-friendly manner with actionable advice.
Be specific about treatments and include organic/natural options when possible.";

/// Tries Plant.id, Susya, then Gemini; falls back to a canned result
#[derive(Clone)]
pub struct DiseaseDetector {
    client: Client,
    plant_id: Option<(String, SecretString)>,
    susya_url: Option<String>,
    gemini: Option<(String, SecretString)>,
}

impl std::fmt::Debug for DiseaseDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiseaseDetector")
            .field("plant_id", &self.plant_id.is_some())
            .field("susya_url", &self.susya_url)
            .field("gemini", &self.gemini.is_some())
            .finish_non_exhaustive()
    }
}

impl DiseaseDetector {
    /// Build a detector from configured keys and endpoints
    #[must_use]
    pub fn new(keys: &ApiKeys, upstream: &UpstreamConfig) -> Self {
        let trim = |url: &str| url.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            plant_id: keys
                .plant_id
                .clone()
                .map(|key| (trim(&upstream.plant_id_url), key)),
            susya_url: upstream.susya_url.as_deref().map(trim),
            gemini: keys
                .gemini
                .clone()
                .map(|key| (trim(&upstream.gemini_url), key)),
        }
    }

    /// A detector with no providers; always answers from the catalogue
    #[must_use]
    pub fn offline() -> Self {
        Self::new(&ApiKeys::default(), &UpstreamConfig::default())
    }

    /// Whether any real provider is configured
    #[must_use]
    pub const fn has_providers(&self) -> bool {
        self.plant_id.is_some() || self.susya_url.is_some() || self.gemini.is_some()
    }

    /// Analyse an image; never fails
    pub async fn detect(&self, image: &[u8], mime_type: &str) -> DiseaseDetection {
        let encoded = BASE64.encode(image);

        if let Some((url, key)) = &self.plant_id {
            match self.ask_plant_id(url, key, &encoded).await {
                Ok(result) => return result,
                Err(e) => tracing::warn!(error = %e, "plant.id detection failed"),
            }
        }

        if let Some(url) = &self.susya_url {
            match self.ask_susya(url, &encoded).await {
                Ok(parsed) => return from_text(parsed, "susya"),
                Err(e) => tracing::warn!(error = %e, "susya detection failed"),
            }
        }

        if let Some((url, key)) = &self.gemini {
            match self.ask_gemini(url, key, &encoded, mime_type).await {
                Ok(parsed) => return from_text(parsed, "gemini"),
                Err(e) => tracing::warn!(error = %e, "gemini detection failed"),
            }
        }

        tracing::info!("using canned disease detection result");
        dummy_result(&mut rand::thread_rng())
    }

    async fn ask_plant_id(
        &self,
        base_url: &str,
        key: &SecretString,
        image: &str,
    ) -> Result<DiseaseDetection> {
        let details = ["local_name", "treatment", "description", "cause"];
        let response = self
            .client
            .post(format!("{base_url}/health_assessment"))
            .header("Api-Key", key.expose_secret())
            .json(&json!({
                "images": [image],
                "health_details": details,
                "disease_details": details,
                "language": "en",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("Plant.id API error: {status}")));
        }

        let body: Value = response.json().await?;
        Ok(transform_plant_id(&body))
    }

    async fn ask_susya(&self, url: &str, image: &str) -> Result<TextDiagnosis> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(SUSYA_TIMEOUT)
            .json(&json!({ "image": image }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Upstream("Susya API request timeout (30s exceeded)".to_string())
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "Susya API error: {status} - {body}"
            )));
        }

        Ok(parse_provider_response(&body))
    }

    async fn ask_gemini(
        &self,
        base_url: &str,
        key: &SecretString,
        image: &str,
        mime_type: &str,
    ) -> Result<TextDiagnosis> {
        let response = self
            .client
            .post(format!("{base_url}/models/{GEMINI_MODEL}:generateContent"))
            .query(&[("key", key.expose_secret())])
            .json(&json!({
                "contents": [{
                    "parts": [
                        { "text": GEMINI_PROMPT },
                        { "inline_data": { "mime_type": mime_type, "data": image } }
                    ]
                }]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("Gemini API error: {status} - {body}")));
        }

        let body: Value = response.json().await?;
        let text: String = body
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::Upstream("Gemini returned no text".to_string()));
        }

        Ok(parse_provider_response(&text))
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

/// Map a Plant.id health assessment onto a detection
///
/// Handles both the flat shape (`is_healthy`, `diseases[]`) and the v3
/// `result.disease.suggestions[]` shape.
#[must_use]
pub fn transform_plant_id(body: &Value) -> DiseaseDetection {
    let root = body.get("result").unwrap_or(body);
    let is_healthy = root
        .pointer("/is_healthy/binary")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let disease = root
        .pointer("/diseases/0")
        .or_else(|| root.pointer("/disease/suggestions/0"));

    let Some(disease) = disease.filter(|_| !is_healthy) else {
        return healthy_result("plant.id");
    };

    let details = disease.get("details").unwrap_or(disease);
    let field = |name: &str| {
        disease
            .get(name)
            .or_else(|| details.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let treatment = details.get("treatment").or_else(|| disease.get("treatment"));
    let probability = disease
        .get("probability")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let confidence = (probability * 100.0).round() as u8;

    DiseaseDetection {
        success: true,
        disease_name: field("name").unwrap_or_else(|| "Unknown Disease".to_string()),
        scientific_name: field("scientific_name"),
        confidence,
        severity: Severity::from_probability(probability),
        description: field("description").unwrap_or_else(|| {
            "Disease detected. Consult an agricultural expert for detailed analysis.".to_string()
        }),
        symptoms: string_list(disease.get("symptoms"))
            .unwrap_or_else(|| vec!["Visible damage on plant".to_string()]),
        treatment: string_list(treatment.and_then(|t| t.get("chemical")))
            .unwrap_or_else(|| vec!["Consult local agricultural extension office".to_string()]),
        prevention: string_list(treatment.and_then(|t| t.get("prevention")))
            .unwrap_or_else(|| vec!["Practice good field hygiene".to_string()]),
        organic_remedies: string_list(treatment.and_then(|t| t.get("biological"))),
        estimated_yield_impact: None,
        image_analysis: None,
        diagnosis: None,
        timestamp: Utc::now(),
        api_source: "plant.id".to_string(),
    }
}

/// Severity keywords in a free-text diagnosis
fn severity_from_text(text: &str) -> Severity {
    let lower = text.to_lowercase();
    if lower.contains("severe") {
        Severity::Severe
    } else if lower.contains("moderate") {
        Severity::Moderate
    } else if lower.contains("mild") {
        Severity::Mild
    } else if lower.contains("healthy") {
        Severity::Healthy
    } else {
        Severity::Moderate
    }
}

/// First meaningful line, stripped of markdown decoration
fn headline(text: &str) -> String {
    text.lines()
        .map(|l| l.trim().trim_matches(|c: char| c == '#' || c == '*').trim())
        .find(|l| !l.is_empty())
        .unwrap_or("Analysis completed")
        .chars()
        .take(120)
        .collect()
}

fn from_text(parsed: TextDiagnosis, api_source: &str) -> DiseaseDetection {
    DiseaseDetection {
        success: true,
        disease_name: headline(&parsed.text),
        scientific_name: None,
        confidence: parsed.confidence,
        severity: severity_from_text(&parsed.text),
        description: parsed.text.clone(),
        symptoms: Vec::new(),
        treatment: parsed.recommendations,
        prevention: Vec::new(),
        organic_remedies: None,
        estimated_yield_impact: None,
        image_analysis: None,
        diagnosis: Some(parsed.text),
        timestamp: Utc::now(),
        api_source: api_source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::disease::catalog::DUMMY_SOURCE;

    fn detector(plant_id: Option<String>, susya: Option<String>, gemini: Option<String>) -> DiseaseDetector {
        let keys = ApiKeys {
            openweather: None,
            plant_id: plant_id.as_ref().map(|_| SecretString::from("pid")),
            gemini: gemini.as_ref().map(|_| SecretString::from("gem")),
        };
        let defaults = UpstreamConfig::default();
        let upstream = UpstreamConfig {
            plant_id_url: plant_id.unwrap_or(defaults.plant_id_url),
            gemini_url: gemini.unwrap_or(defaults.gemini_url),
            susya_url: susya,
            ..UpstreamConfig::default()
        };
        DiseaseDetector::new(&keys, &upstream)
    }

    #[tokio::test]
    async fn test_offline_returns_canned_result() {
        let detector = DiseaseDetector::offline();
        assert!(!detector.has_providers());

        let result = detector.detect(b"img", "image/jpeg").await;
        assert_eq!(result.api_source, DUMMY_SOURCE);
        assert!(result.confidence <= 100);
    }

    #[test]
    fn test_plant_id_flat_disease() {
        let body = json!({
            "is_healthy": { "binary": false },
            "diseases": [{
                "name": "Early blight",
                "probability": 0.42,
                "treatment": { "chemical": ["Chlorothalonil"], "biological": ["Bacillus subtilis"] }
            }]
        });
        let result = transform_plant_id(&body);
        assert_eq!(result.disease_name, "Early blight");
        assert_eq!(result.confidence, 42);
        assert_eq!(result.severity, Severity::Moderate);
        assert_eq!(result.treatment, ["Chlorothalonil"]);
        assert_eq!(result.prevention, ["Practice good field hygiene"]);
        assert_eq!(result.organic_remedies, Some(vec!["Bacillus subtilis".to_string()]));
    }

    #[test]
    fn test_plant_id_v3_shape() {
        let body = json!({
            "result": {
                "is_healthy": { "binary": false, "probability": 0.1 },
                "disease": { "suggestions": [{
                    "name": "Fungi",
                    "probability": 0.8,
                    "details": { "description": "Fungal infection" }
                }]}
            }
        });
        let result = transform_plant_id(&body);
        assert_eq!(result.severity, Severity::Severe);
        assert_eq!(result.description, "Fungal infection");
    }

    #[test]
    fn test_plant_id_healthy() {
        let result = transform_plant_id(&json!({ "is_healthy": { "binary": true } }));
        assert_eq!(result.severity, Severity::Healthy);
        assert_eq!(result.api_source, "plant.id");

        let result = transform_plant_id(&json!({ "diseases": [] }));
        assert_eq!(result.disease_name, "Healthy Plant");
    }

    #[tokio::test]
    async fn test_plant_id_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/health_assessment"))
            .and(header("Api-Key", "pid"))
            .and(body_partial_json(json!({ "images": ["aW1n"], "language": "en" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "is_healthy": { "binary": true }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = detector(Some(server.uri()), None, None)
            .detect(b"img", "image/png")
            .await;
        assert_eq!(result.api_source, "plant.id");
    }

    #[tokio::test]
    async fn test_susya_after_plant_id_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/health_assessment"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/susya"))
            .and(body_partial_json(json!({ "image": "aW1n" })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "Severe leaf blight. Confidence: 88%\n1. Spray mancozeb every 10 days",
            ))
            .mount(&server)
            .await;

        let result = detector(
            Some(server.uri()),
            Some(format!("{}/susya", server.uri())),
            None,
        )
        .detect(b"img", "image/jpeg")
        .await;

        assert_eq!(result.api_source, "susya");
        assert_eq!(result.confidence, 88);
        assert_eq!(result.severity, Severity::Severe);
        assert_eq!(result.treatment, ["Spray mancozeb every 10 days"]);
        assert_eq!(result.disease_name, "Severe leaf blight. Confidence: 88%");
    }

    #[tokio::test]
    async fn test_gemini_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [
                    { "text": "**Plant looks healthy**\n- Keep watering at the base" }
                ]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = detector(None, None, Some(server.uri()))
            .detect(b"img", "image/jpeg")
            .await;

        assert_eq!(result.api_source, "gemini");
        assert_eq!(result.disease_name, "Plant looks healthy");
        assert_eq!(result.severity, Severity::Healthy);
        assert_eq!(result.confidence, 85);
    }

    #[tokio::test]
    async fn test_all_providers_failing_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = detector(
            Some(server.uri()),
            Some(server.uri()),
            Some(server.uri()),
        )
        .detect(b"img", "image/jpeg")
        .await;
        assert_eq!(result.api_source, DUMMY_SOURCE);
    }
}

//! Farming backend clients used by the assistant
//!
//! [`HttpBackend`] talks to a running AgroMitra server over HTTP.
//! [`LocalBackend`] calls the same services in-process and backs the server's
//! own assistant endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::db::FarmRepo;
use crate::db::farm::FarmInfo;
use crate::farming::{
    CropRecommendation, CropRecommendationRequest, Diagnosis, KnowledgeBase, KnowledgeHit,
    MarketPrice, Season, TaskRecommendation, WeatherClient, WeatherReport, diagnose_symptoms,
    market_prices, recommend_crops, seasonal_tasks,
};
use crate::{Error, Result};

/// Operations the assistant needs from the farming backend
#[async_trait]
pub trait FarmingBackend: Send + Sync {
    /// Weather report for a city
    async fn weather(&self, city: &str) -> Result<WeatherReport>;

    /// Crop recommendations for a plot
    async fn crop_recommendations(
        &self,
        request: &CropRecommendationRequest,
    ) -> Result<Vec<CropRecommendation>>;

    /// Tasks for a season, optionally for a crop
    async fn tasks(&self, season: Season, crop: Option<&str>) -> Result<Vec<TaskRecommendation>>;

    /// Market prices, optionally filtered by crop
    async fn market_prices(&self, crop: Option<&str>) -> Result<Vec<MarketPrice>>;

    /// Diagnose symptoms
    async fn diagnose(&self, symptoms: &str, crop: Option<&str>) -> Result<Diagnosis>;

    /// Knowledge search
    async fn search_knowledge(&self, query: &str, limit: usize) -> Result<Vec<KnowledgeHit>>;

    /// Farm portfolio for a user
    async fn farm_info(&self, user_id: &str) -> Result<FarmInfo>;
}

#[derive(Deserialize)]
struct RecommendationsEnvelope {
    #[serde(default)]
    recommendations: Vec<CropRecommendation>,
}

#[derive(Deserialize)]
struct TasksEnvelope {
    #[serde(default)]
    tasks: Vec<TaskRecommendation>,
}

#[derive(Deserialize)]
struct PricesEnvelope {
    #[serde(default)]
    data: Vec<MarketPrice>,
}

#[derive(Deserialize)]
struct DiagnosisEnvelope {
    #[serde(default)]
    diagnosis: Option<Diagnosis>,
}

#[derive(Deserialize)]
struct KnowledgeEnvelope {
    #[serde(default)]
    results: Vec<KnowledgeHit>,
}

/// HTTP client for the `/api/farming` and `/api/farms` endpoints
///
/// One attempt per call; non-2xx responses are errors.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for a backend base URL such as `http://localhost:5000`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "farming backend error: {status} - {body}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl FarmingBackend for HttpBackend {
    async fn weather(&self, city: &str) -> Result<WeatherReport> {
        let url = self.url(&format!(
            "/api/farming/weather/{}",
            urlencoding::encode(city)
        ));
        Self::send(self.client.get(url)).await
    }

    async fn crop_recommendations(
        &self,
        request: &CropRecommendationRequest,
    ) -> Result<Vec<CropRecommendation>> {
        let url = self.url("/api/farming/crop-recommendations");
        let envelope: RecommendationsEnvelope =
            Self::send(self.client.post(url).json(request)).await?;
        Ok(envelope.recommendations)
    }

    async fn tasks(&self, season: Season, crop: Option<&str>) -> Result<Vec<TaskRecommendation>> {
        let url = self.url("/api/farming/tasks");
        let mut request = self.client.get(url).query(&[("season", season.as_str())]);
        if let Some(crop) = crop {
            request = request.query(&[("cropType", crop)]);
        }
        let envelope: TasksEnvelope = Self::send(request).await?;
        Ok(envelope.tasks)
    }

    async fn market_prices(&self, crop: Option<&str>) -> Result<Vec<MarketPrice>> {
        let url = self.url("/api/farming/market-prices");
        let mut request = self.client.get(url);
        if let Some(crop) = crop {
            request = request.query(&[("crop", crop)]);
        }
        let envelope: PricesEnvelope = Self::send(request).await?;
        Ok(envelope.data)
    }

    async fn diagnose(&self, symptoms: &str, crop: Option<&str>) -> Result<Diagnosis> {
        let url = self.url("/api/farming/diagnose-disease");
        let body = serde_json::json!({ "symptoms": symptoms, "cropType": crop });
        let envelope: DiagnosisEnvelope = Self::send(self.client.post(url).json(&body)).await?;
        Ok(envelope.diagnosis.unwrap_or_default())
    }

    async fn search_knowledge(&self, query: &str, limit: usize) -> Result<Vec<KnowledgeHit>> {
        let url = self.url("/api/farming/knowledge/search");
        let limit = limit.to_string();
        let request = self
            .client
            .get(url)
            .query(&[("query", query), ("limit", limit.as_str())]);
        let envelope: KnowledgeEnvelope = Self::send(request).await?;
        Ok(envelope.results)
    }

    async fn farm_info(&self, user_id: &str) -> Result<FarmInfo> {
        let url = self.url("/api/farms/summary");
        Self::send(self.client.get(url).query(&[("user_id", user_id)])).await
    }
}

/// In-process backend over the farming services and farm repository
#[derive(Debug, Clone)]
pub struct LocalBackend {
    weather: WeatherClient,
    knowledge: Arc<KnowledgeBase>,
    farms: FarmRepo,
}

impl LocalBackend {
    #[must_use]
    pub const fn new(weather: WeatherClient, knowledge: Arc<KnowledgeBase>, farms: FarmRepo) -> Self {
        Self {
            weather,
            knowledge,
            farms,
        }
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[async_trait]
impl FarmingBackend for LocalBackend {
    async fn weather(&self, city: &str) -> Result<WeatherReport> {
        self.weather.report(city).await
    }

    async fn crop_recommendations(
        &self,
        request: &CropRecommendationRequest,
    ) -> Result<Vec<CropRecommendation>> {
        if request.latitude.is_none() || request.longitude.is_none() {
            return Err(Error::Validation(
                "Latitude and longitude are required".to_string(),
            ));
        }
        Ok(recommend_crops(request.land_size))
    }

    async fn tasks(&self, season: Season, _crop: Option<&str>) -> Result<Vec<TaskRecommendation>> {
        Ok(seasonal_tasks(season, today()))
    }

    async fn market_prices(&self, crop: Option<&str>) -> Result<Vec<MarketPrice>> {
        Ok(market_prices(crop, today()))
    }

    async fn diagnose(&self, symptoms: &str, _crop: Option<&str>) -> Result<Diagnosis> {
        Ok(diagnose_symptoms(symptoms))
    }

    async fn search_knowledge(&self, query: &str, limit: usize) -> Result<Vec<KnowledgeHit>> {
        if query.trim().is_empty() {
            return Err(Error::Validation("Query parameter is required".to_string()));
        }
        Ok(self.knowledge.search(query, None, limit))
    }

    async fn farm_info(&self, user_id: &str) -> Result<FarmInfo> {
        self.farms.farm_info_for_assistant(user_id)
    }
}

//! Farming backend endpoints consumed by the assistant and the web client

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiError, ApiResult, ApiState, bad_request, error_response};
use crate::Error;
use crate::agent::current_season;
use crate::farming::knowledge::DEFAULT_SEARCH_LIMIT;
use crate::farming::{
    CropRecommendation, CropRecommendationRequest, Diagnosis, DiagnosisConfidence, KnowledgeHit,
    MarketPrice, Season, TaskRecommendation, WeatherReport, diagnose_symptoms, market_prices,
    recommend_crops, seasonal_tasks,
};

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

// --- Knowledge ---

#[derive(Deserialize)]
pub struct KnowledgeQuery {
    pub query: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct KnowledgeResponse {
    pub success: bool,
    pub query: String,
    pub results: Vec<KnowledgeHit>,
    pub total: usize,
}

async fn search_knowledge(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<KnowledgeQuery>,
) -> ApiResult<KnowledgeResponse> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| bad_request("Query parameter is required"))?;

    let results = state.knowledge.search(
        &query,
        params.category.as_deref(),
        params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
    );

    Ok(Json(KnowledgeResponse {
        success: true,
        total: results.len(),
        query,
        results,
    }))
}

// --- Market prices ---

#[derive(Deserialize)]
pub struct MarketQuery {
    pub crop: Option<String>,
    /// Accepted for compatibility; the board is not regional
    pub location: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketResponse {
    pub success: bool,
    pub data: Vec<MarketPrice>,
    pub last_updated: DateTime<Utc>,
}

async fn get_market_prices(Query(params): Query<MarketQuery>) -> Json<MarketResponse> {
    Json(MarketResponse {
        success: true,
        data: market_prices(params.crop.as_deref(), today()),
        last_updated: Utc::now(),
    })
}

// --- Crop recommendations ---

#[derive(Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropsResponse {
    pub success: bool,
    pub location: Location,
    pub soil_type: String,
    /// Acres, or `"not specified"`
    pub land_size: Value,
    pub recommendations: Vec<CropRecommendation>,
    pub generated_at: DateTime<Utc>,
}

async fn crop_recommendations(
    Json(request): Json<CropRecommendationRequest>,
) -> ApiResult<CropsResponse> {
    let (Some(latitude), Some(longitude)) = (request.latitude, request.longitude) else {
        return Err(bad_request("Latitude and longitude are required"));
    };

    Ok(Json(CropsResponse {
        success: true,
        location: Location {
            latitude,
            longitude,
        },
        soil_type: request
            .soil_type
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "loamy".to_string()),
        land_size: request
            .land_size
            .filter(|size| *size != 0.0 && !size.is_nan())
            .map_or_else(|| Value::from("not specified"), Value::from),
        recommendations: recommend_crops(request.land_size),
        generated_at: Utc::now(),
    }))
}

// --- Weather ---

#[derive(Serialize)]
pub struct WeatherResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: WeatherReport,
}

fn weather_error(err: Error) -> ApiError {
    match err {
        Error::Config(message) => error_response(StatusCode::INTERNAL_SERVER_ERROR, message),
        Error::NotFound(_) => error_response(StatusCode::NOT_FOUND, "City not found"),
        other => {
            tracing::error!(error = %other, "weather lookup failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch weather data",
            )
        }
    }
}

async fn get_weather(
    State(state): State<Arc<ApiState>>,
    Path(city): Path<String>,
) -> ApiResult<WeatherResponse> {
    let report = state.weather.report(&city).await.map_err(weather_error)?;
    Ok(Json(WeatherResponse {
        success: true,
        report,
    }))
}

// --- Symptom diagnosis ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseRequest {
    pub symptoms: Option<String>,
    pub crop_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseResponse {
    pub success: bool,
    pub symptoms: String,
    pub crop_type: String,
    pub diagnosis: Diagnosis,
    pub confidence: DiagnosisConfidence,
    pub generated_at: DateTime<Utc>,
}

async fn diagnose_disease(Json(request): Json<DiagnoseRequest>) -> ApiResult<DiagnoseResponse> {
    let symptoms = request
        .symptoms
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("Symptoms description is required"))?;

    let diagnosis = diagnose_symptoms(&symptoms);
    Ok(Json(DiagnoseResponse {
        success: true,
        confidence: diagnosis.confidence(),
        crop_type: request
            .crop_type
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "general".to_string()),
        symptoms,
        diagnosis,
        generated_at: Utc::now(),
    }))
}

// --- Seasonal tasks ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    pub season: Option<String>,
    pub crop_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksResponse {
    pub success: bool,
    pub season: String,
    pub crop_type: String,
    pub tasks: Vec<TaskRecommendation>,
    pub generated_at: DateTime<Utc>,
}

async fn get_tasks(Query(params): Query<TasksQuery>) -> Json<TasksResponse> {
    let (season, tasks) = match params.season.filter(|s| !s.trim().is_empty()) {
        None => {
            let season = current_season();
            (season.to_string(), seasonal_tasks(season, today()))
        }
        Some(raw) => match raw.parse::<Season>() {
            Ok(season) => (season.to_string(), seasonal_tasks(season, today())),
            Err(_) => (raw, Vec::new()),
        },
    };

    Json(TasksResponse {
        success: true,
        season,
        crop_type: params
            .crop_type
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "general".to_string()),
        tasks,
        generated_at: Utc::now(),
    })
}

/// Build the farming router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/knowledge/search", get(search_knowledge))
        .route("/market-prices", get(get_market_prices))
        .route("/crop-recommendations", post(crop_recommendations))
        .route("/weather/{city}", get(get_weather))
        .route("/diagnose-disease", post(diagnose_disease))
        .route("/tasks", get(get_tasks))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_error_mapping() {
        let (status, Json(body)) =
            weather_error(Error::Config("Weather API key not configured".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Weather API key not configured");

        let (status, Json(body)) = weather_error(Error::NotFound("x".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "City not found");

        let (status, Json(body)) = weather_error(Error::Upstream("502".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to fetch weather data");
    }
}

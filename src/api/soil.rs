//! Soil information endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use super::{ApiResult, ApiState, bad_request, error_response};
use crate::Error;
use crate::soil::{SoilReport, parse_coordinates};

/// Coordinates as `lat`/`lon` or `latitude`/`longitude`
#[derive(Deserialize)]
pub struct SoilQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

async fn soil_info(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<SoilQuery>,
) -> ApiResult<SoilReport> {
    let lat = params.lat.or(params.latitude);
    let lon = params.lon.or(params.longitude);

    let (lat, lon) = parse_coordinates(lat.as_deref(), lon.as_deref()).map_err(|e| match e {
        Error::Validation(message) => bad_request(message),
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    })?;

    let report = state.soil.report(lat, lon).await.map_err(|e| {
        tracing::error!(error = %e, lat, lon, "soil lookup failed");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error while fetching soil data",
        )
    })?;

    Ok(Json(report))
}

/// Build the soil router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/soil-info", get(soil_info))
        .with_state(state)
}

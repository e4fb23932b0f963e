//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;

use agromitra::api::{self, ApiState};
use agromitra::geo::LatLng;
use agromitra::db::NewFarm;
use agromitra::scraper::MarketScraper;
use agromitra::{Config, DbPool, db};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Configuration with every external service pointed at `upstream`
#[must_use]
pub fn test_config(upstream: &str) -> Config {
    let mut config = Config::default();
    config.upstream.openweather_url = upstream.to_string();
    config.upstream.soilgrids_url = upstream.to_string();
    config.upstream.plant_id_url = upstream.to_string();
    config.upstream.gemini_url = upstream.to_string();
    config.upstream.susya_url = None;
    config.server.rate_limit_per_minute = None;
    config
}

/// Router over a fresh state with an instant scraper
#[must_use]
pub fn build_test_router(config: &Config, db: DbPool) -> axum::Router {
    let state = ApiState::new(config, db).with_scraper(MarketScraper::new().with_delay_scale(0.0));
    api::router(Arc::new(state))
}

/// A small square plot near Delhi
#[must_use]
pub fn sample_farm(name: &str, crop: &str) -> NewFarm {
    NewFarm {
        name: name.to_string(),
        crop_type: crop.to_string(),
        soil_type: "Loam".to_string(),
        irrigation_type: "Drip".to_string(),
        notes: String::new(),
        coordinates: vec![
            LatLng::new(28.6000, 77.2000),
            LatLng::new(28.6000, 77.2010),
            LatLng::new(28.6010, 77.2010),
            LatLng::new(28.6010, 77.2000),
        ],
        soil_data: None,
    }
}

/// Send a request and decode the JSON body (`Null` when empty)
pub async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: &Value,
) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

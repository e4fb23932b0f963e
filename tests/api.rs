//! API endpoint integration tests

use std::sync::Arc;
use std::time::Duration;

use agromitra::api::{self, ApiState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{build_test_router, get, sample_farm, send, send_json, setup_test_db, test_config};

/// Router whose external services all point at an unreachable address
fn offline_router() -> axum::Router {
    build_test_router(&test_config("http://127.0.0.1:9"), setup_test_db())
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = offline_router();
    let (status, json) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = offline_router();
    let (status, json) = get(&app, "/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["weather"]["status"], "unavailable");
}

// --- /api/farming ---

#[tokio::test]
async fn test_knowledge_search_requires_query() {
    let app = offline_router();

    let (status, json) = get(&app, "/api/farming/knowledge/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Query parameter is required");

    let (status, _) = get(&app, "/api/farming/knowledge/search?query=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_knowledge_search_results() {
    let app = offline_router();
    let (status, json) = get(&app, "/api/farming/knowledge/search?query=rice&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["query"], "rice");
    let results = json["results"].as_array().unwrap();
    assert!(results.len() <= 2);
    assert_eq!(json["total"], results.len());
    assert!(results.iter().all(|r| r["score"].as_u64().unwrap() > 0));
}

#[tokio::test]
async fn test_market_prices_filter() {
    let app = offline_router();

    let (status, json) = get(&app, "/api/farming/market-prices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 6);
    assert!(json["lastUpdated"].is_string());

    let (_, json) = get(&app, "/api/farming/market-prices?crop=RICE").await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["crop"], "Rice");
    assert_eq!(data[0]["unit"], "per quintal");
    assert_eq!(data[0]["trend"], "up");
}

#[tokio::test]
async fn test_crop_recommendations() {
    let app = offline_router();
    let uri = "/api/farming/crop-recommendations";

    let (status, json) = send_json(&app, "POST", uri, &json!({ "latitude": 28.6 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Latitude and longitude are required");

    let (status, json) = send_json(
        &app,
        "POST",
        uri,
        &json!({ "latitude": 28.6, "longitude": 77.2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["soilType"], "loamy");
    assert_eq!(json["landSize"], "not specified");
    assert_eq!(json["location"]["longitude"], 77.2);
    assert_eq!(json["recommendations"].as_array().unwrap().len(), 3);

    let (_, json) = send_json(
        &app,
        "POST",
        uri,
        &json!({ "latitude": 28.6, "longitude": 77.2, "soilType": "clay", "landSize": 1.5 }),
    )
    .await;
    assert_eq!(json["soilType"], "clay");
    assert_eq!(json["landSize"], 1.5);
    let crops: Vec<&str> = json["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["crop"].as_str().unwrap())
        .collect();
    assert!(!crops.contains(&"Rice"));
}

#[tokio::test]
async fn test_weather_without_key() {
    let app = offline_router();
    let (status, json) = get(&app, "/api/farming/weather/delhi").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Weather API key not configured");
}

#[tokio::test]
async fn test_weather_from_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Delhi",
            "main": { "temp": 8.2, "humidity": 70, "pressure": 1015 },
            "weather": [{ "main": "Clear", "description": "clear sky" }],
            "wind": { "speed": 1.2 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "list": [] })))
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.api_keys.openweather = Some(SecretString::from("test-key"));
    let app = build_test_router(&config, setup_test_db());

    let (status, json) = get(&app, "/api/farming/weather/delhi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["location"], "Delhi");
    assert_eq!(json["current"]["temperature"], 8);
    assert_eq!(json["current"]["windSpeed"], 1.2);
    // Cold weather advice
    assert_eq!(json["farmingAdvice"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_weather_unknown_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.api_keys.openweather = Some(SecretString::from("test-key"));
    let app = build_test_router(&config, setup_test_db());

    let (status, json) = get(&app, "/api/farming/weather/atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "City not found");
}

#[tokio::test]
async fn test_diagnose_disease() {
    let app = offline_router();
    let uri = "/api/farming/diagnose-disease";

    let (status, json) = send_json(&app, "POST", uri, &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Symptoms description is required");

    let (status, json) = send_json(
        &app,
        "POST",
        uri,
        &json!({ "symptoms": "Yellowing leaves with brown spots" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cropType"], "general");
    assert_eq!(json["confidence"], "medium");
    assert!(!json["diagnosis"]["possibleDiseases"].as_array().unwrap().is_empty());

    let (_, json) = send_json(&app, "POST", uri, &json!({ "symptoms": "looks odd" })).await;
    assert_eq!(json["confidence"], "low");
}

#[tokio::test]
async fn test_tasks_by_season() {
    let app = offline_router();

    let (status, json) = get(&app, "/api/farming/tasks?season=winter&cropType=wheat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["season"], "winter");
    assert_eq!(json["cropType"], "wheat");
    assert!(!json["tasks"].as_array().unwrap().is_empty());

    let (_, json) = get(&app, "/api/farming/tasks?season=post-monsoon").await;
    assert!(json["tasks"].as_array().unwrap().is_empty());

    let (status, json) = get(&app, "/api/farming/tasks?season=spring").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["season"], "spring");
    assert!(json["tasks"].as_array().unwrap().is_empty());

    let (_, json) = get(&app, "/api/farming/tasks").await;
    assert!(json["season"].is_string());
    assert_eq!(json["cropType"], "general");
}

// --- /api/soil-info ---

#[tokio::test]
async fn test_soil_info_validation() {
    let app = offline_router();

    let (status, json) = get(&app, "/api/soil-info?lat=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing required parameters: latitude and longitude");

    let (status, json) = get(&app, "/api/soil-info?lat=abc&lon=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid latitude or longitude values");

    let (status, _) = get(&app, "/api/soil-info?latitude=95&longitude=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_soil_info_falls_back_to_estimates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = build_test_router(&test_config(&server.uri()), setup_test_db());
    let (status, json) = get(&app, "/api/soil-info?latitude=48.85&longitude=2.35").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_simulated"], true);
    assert_eq!(json["data_source"], "Regional estimates (ISRIC data unavailable)");
    assert_eq!(json["coordinates"]["lat"], 48.85);
    assert!(json["texture"]["classification"]["type"].is_string());
}

// --- disease detection ---

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "agromitra-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"leaf.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/detect-disease")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_detect_disease_requires_image() {
    let app = offline_router();
    let (status, json) = send(&app, multipart_request("photo", b"\xff\xd8\xff")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No image provided");
}

#[tokio::test]
async fn test_detect_disease_without_providers() {
    let app = offline_router();
    let (status, json) = send(&app, multipart_request("image", b"\xff\xd8\xff\xe0fake")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["apiSource"], "dummy_api");
    let confidence = json["confidence"].as_u64().unwrap();
    assert!(confidence <= 100);
    assert!(
        ["mild", "moderate", "severe", "healthy"].contains(&json["severity"].as_str().unwrap())
    );
}

#[tokio::test]
async fn test_disease_crop_info() {
    let app = offline_router();

    let (status, json) = get(&app, "/api/disease/crops/Tomato").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["cropName"].is_string());
    assert!(!json["commonDiseases"].as_array().unwrap().is_empty());

    let (status, _) = get(&app, "/api/disease/crops/quinoa").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- /api/farms ---

#[tokio::test]
async fn test_farm_lifecycle() {
    let app = offline_router();
    let farm = json!({
        "name": "North field",
        "cropType": "Wheat",
        "soilType": "Loam",
        "irrigationType": "Drip",
        "coordinates": sample_farm("x", "y").coordinates,
    });

    let (status, created) = send_json(&app, "POST", "/api/farms", &farm).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(created["totalArea"].as_f64().unwrap() > 0.0);

    let (_, list) = get(&app, "/api/farms").await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, fetched) = get(&app, &format!("/api/farms/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "North field");

    let (status, patched) = send_json(
        &app,
        "PATCH",
        &format!("/api/farms/{id}"),
        &json!({ "name": "South field" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["name"], "South field");
    assert_eq!(patched["cropType"], "Wheat");

    let (status, with_soil) = send_json(
        &app,
        "PUT",
        &format!("/api/farms/{id}/soil"),
        &json!({ "clay": 22.0, "ph": 6.8, "textureClass": "Loam" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(with_soil["soilData"]["textureClass"], "Loam");

    let (_, summary) = get(&app, "/api/farms/summary").await;
    assert_eq!(summary["summary"]["totalFarms"], 1);
    assert_eq!(summary["summary"]["cropTypes"], json!(["Wheat"]));

    let (status, _) = get(&app, "/api/farms/selected").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, selected) =
        send_json(&app, "PUT", "/api/farms/selected", &json!({ "farmId": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selected["id"], id.as_str());
    let (_, selected) = get(&app, "/api/farms/selected").await;
    assert_eq!(selected["id"], id.as_str());

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/farms/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/api/farms/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, json) = send_json(
        &app,
        "PATCH",
        &format!("/api/farms/{id}"),
        &json!({ "name": "Gone" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Farm not found");
}

#[tokio::test]
async fn test_farms_are_scoped_by_user() {
    let app = offline_router();
    let farm = json!({ "name": "Plot", "coordinates": sample_farm("x", "y").coordinates });

    let (status, _) = send_json(&app, "POST", "/api/farms?user_id=asha", &farm).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, mine) = get(&app, "/api/farms?user_id=asha").await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (_, default_user) = get(&app, "/api/farms").await;
    assert!(default_user.as_array().unwrap().is_empty());
}

// --- /api/community ---

#[tokio::test]
async fn test_community_feed() {
    let app = offline_router();

    let (status, _) = send_json(&app, "POST", "/api/community/posts", &json!({ "content": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, posts) = get(&app, "/api/community/posts").await;
    assert!(posts.as_array().unwrap().is_empty());

    let (status, post) = send_json(
        &app,
        "POST",
        "/api/community/posts",
        &json!({ "author": "Ravi", "content": "Best time to sow mustard?" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["tag"], "Questions");
    let id = post["id"].as_str().unwrap().to_string();

    let like_uri = format!("/api/community/posts/{id}/like?user_id=u1");
    let (_, like) = send_json(&app, "POST", &like_uri, &json!({})).await;
    assert_eq!(like, json!({ "liked": true, "likes": 1 }));
    let (_, like) = send_json(&app, "POST", &like_uri, &json!({})).await;
    assert_eq!(like, json!({ "liked": false, "likes": 0 }));

    let (_, share) = send_json(&app, "POST", &format!("/api/community/posts/{id}/share"), &json!({})).await;
    assert_eq!(share["shares"], 1);

    let (status, _) = send_json(&app, "POST", "/api/community/posts/missing/share", &json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- /api/assistant ---

#[tokio::test]
async fn test_assistant_session() {
    let app = offline_router();

    let (status, _) = send_json(&app, "POST", "/api/assistant/query", &json!({ "text": " " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, reply) = send_json(
        &app,
        "POST",
        "/api/assistant/query",
        &json!({ "text": "What's the weather in Delhi" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!reply["response"].as_str().unwrap().is_empty());
    assert_eq!(reply["actions"][0]["type"], "weather");
    let session_id = reply["session_id"].as_str().unwrap().to_string();

    let history_uri = format!("/api/assistant/sessions/{session_id}/history");
    let (status, history) = get(&app, &history_uri).await;
    assert_eq!(status, StatusCode::OK);
    let turns = history["history"].as_array().unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[1]["role"], "assistant");

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/assistant/sessions/{session_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, history) = get(&app, &history_uri).await;
    assert!(history["history"].as_array().unwrap().is_empty());

    let (status, _) = get(&app, "/api/assistant/sessions/nope/history").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assistant_idle_session_expires() {
    let state = ApiState::new(&test_config("http://127.0.0.1:9"), setup_test_db())
        .with_session_idle_timeout(Duration::from_millis(200));
    let app = api::router(Arc::new(state));

    let (status, reply) = send_json(
        &app,
        "POST",
        "/api/assistant/query",
        &json!({ "text": "What's the weather in Delhi" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let history_uri = format!(
        "/api/assistant/sessions/{}/history",
        reply["session_id"].as_str().unwrap()
    );

    let (status, _) = get(&app, &history_uri).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(500)).await;
    let (status, json) = get(&app, &history_uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Session not found");
}

#[tokio::test]
async fn test_assistant_crops_needs_farm() {
    let app = offline_router();
    let (_, reply) = send_json(
        &app,
        "POST",
        "/api/assistant/query",
        &json!({ "text": "which crop should I grow", "session_id": "s1" }),
    )
    .await;

    assert_eq!(reply["session_id"], "s1");
    assert_eq!(reply["should_redirect"], true);
    assert_eq!(reply["redirect_to"], "/my-farm");
}

// --- /api/market ---

#[tokio::test]
async fn test_market_scrape() {
    let app = offline_router();
    let (status, json) = send_json(&app, "POST", "/api/market/scrape?commodity=rice", &json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["scrapedFrom"].as_array().unwrap().len(), 5);
    assert!(json["totalRecordsScraped"].as_u64().unwrap() >= 75);
    let data = json["data"].as_array().unwrap();
    assert_eq!(json["total"], data.len());
    assert!(data.iter().all(|r| r["commodity"] == "Rice"));
}

#[tokio::test]
async fn test_market_catalog() {
    let app = offline_router();
    let (status, json) = get(&app, "/api/market/commodities").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sources"].as_array().unwrap().len(), 5);
    assert_eq!(json["commodities"].as_array().unwrap().len(), 16);
    assert_eq!(json["commodities"][0]["unit"], "₹/quintal");
}

// --- middleware ---

#[tokio::test]
async fn test_rate_limit() {
    let mut config = test_config("http://127.0.0.1:9");
    config.server.rate_limit_per_minute = Some(1);
    let app = build_test_router(&config, setup_test_db());

    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"], "Too many requests");
}

//! `OpenWeatherMap` integration with farming advice
//!
//! Current conditions and the 3-hourly forecast are fetched concurrently and
//! folded into a [`WeatherReport`]. Reports are cached per city for ten
//! minutes.

use std::time::Duration;

use mini_moka::sync::Cache;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How long a city's report is served from cache
pub const WEATHER_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Forecast entries kept in a report
const FORECAST_ENTRIES: usize = 5;

/// Current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: i64,
    pub humidity: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<u32>,
}

/// A forecast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub temp: i64,
    pub description: String,
    #[serde(default)]
    pub precipitation: f64,
}

/// Weather report for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub location: String,
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: Vec<ForecastDay>,
    #[serde(default)]
    pub farming_advice: Vec<String>,
}

impl WeatherReport {
    /// Placeholder used when the weather service cannot be reached
    #[must_use]
    pub fn unavailable(location: &str) -> Self {
        Self {
            location: location.to_string(),
            current: CurrentConditions {
                temperature: 25,
                humidity: 65,
                description: "partly cloudy".to_string(),
                wind_speed: None,
                pressure: None,
            },
            forecast: Vec::new(),
            farming_advice: vec!["Weather data temporarily unavailable".to_string()],
        }
    }
}

/// Farming advice for a temperature (°C) and weather group (e.g. "Rain")
#[must_use]
pub fn farming_advice(temperature: f64, main: &str) -> Vec<String> {
    let mut advice: Vec<&str> = Vec::new();

    if temperature > 35.0 {
        advice.extend([
            "High temperature - increase irrigation frequency",
            "Apply mulch to protect crops from heat stress",
            "Schedule farming activities for early morning/evening",
        ]);
    } else if temperature < 10.0 {
        advice.extend([
            "Cold weather - protect sensitive crops with covers",
            "Reduce irrigation frequency",
            "Consider frost protection measures",
        ]);
    }

    if main.to_lowercase().contains("rain") {
        advice.extend([
            "Rain expected - check drainage systems",
            "Avoid pesticide/fungicide application during rain",
        ]);
    }

    advice.into_iter().map(String::from).collect()
}

// OpenWeatherMap wire types

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    name: String,
    main: OwmMain,
    weather: Vec<OwmCondition>,
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    #[serde(default)]
    humidity: u32,
    pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    weather: Vec<OwmCondition>,
    rain: Option<OwmRain>,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[allow(clippy::cast_possible_truncation)]
fn round_temp(temp: f64) -> i64 {
    temp.round() as i64
}

fn build_report(current: OwmCurrent, forecast: OwmForecast) -> WeatherReport {
    let (main, description) = current
        .weather
        .first()
        .map(|w| (w.main.as_str(), w.description.clone()))
        .unwrap_or_default();

    let farming_advice = farming_advice(current.main.temp, main);

    let forecast = forecast
        .list
        .into_iter()
        .take(FORECAST_ENTRIES)
        .map(|item| ForecastDay {
            date: chrono::DateTime::from_timestamp(item.dt, 0)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            temp: round_temp(item.main.temp),
            description: item
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_default(),
            precipitation: item.rain.and_then(|r| r.three_hours).unwrap_or(0.0),
        })
        .collect();

    WeatherReport {
        location: current.name,
        current: CurrentConditions {
            temperature: round_temp(current.main.temp),
            humidity: current.main.humidity,
            description,
            wind_speed: current.wind.map(|w| w.speed),
            pressure: current.main.pressure,
        },
        forecast,
        farming_advice,
    }
}

/// Client for the `OpenWeatherMap` current and forecast endpoints
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    cache: Cache<String, WeatherReport>,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .field("configured", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    /// Create a weather client
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            cache: Cache::builder()
                .max_capacity(256)
                .time_to_live(WEATHER_CACHE_TTL)
                .build(),
        }
    }

    /// Whether an API key is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch the report for a city
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` without an API key, `Error::NotFound` when the
    /// city is unknown, or an upstream/HTTP error otherwise
    pub async fn report(&self, city: &str) -> Result<WeatherReport> {
        let Some(api_key) = &self.api_key else {
            return Err(Error::Config("Weather API key not configured".to_string()));
        };

        let cache_key = city.trim().to_lowercase();
        if let Some(report) = self.cache.get(&cache_key) {
            tracing::debug!(city = %city, "weather cache hit");
            return Ok(report);
        }

        let query = [
            ("q", city),
            ("appid", api_key.expose_secret()),
            ("units", "metric"),
        ];

        let (current, forecast) = tokio::try_join!(
            self.get::<OwmCurrent>("weather", &query),
            self.get::<OwmForecast>("forecast", &query),
        )?;

        let report = build_report(current, forecast);
        tracing::info!(city = %city, temp = report.current.temperature, "fetched weather");

        self.cache.insert(cache_key, report.clone());
        Ok(report)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound("City not found".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "OpenWeatherMap error: {status} - {body}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn current_body(temp: f64, main: &str) -> serde_json::Value {
        serde_json::json!({
            "name": "Delhi",
            "main": { "temp": temp, "humidity": 40, "pressure": 1008 },
            "weather": [{ "main": main, "description": "light rain" }],
            "wind": { "speed": 3.5 }
        })
    }

    fn forecast_body() -> serde_json::Value {
        let list: Vec<_> = (0..8)
            .map(|i| {
                serde_json::json!({
                    "dt": 1_700_000_000 + i * 10_800,
                    "main": { "temp": 30.4, "humidity": 50 },
                    "weather": [{ "main": "Clouds", "description": "broken clouds" }],
                    "rain": { "3h": 0.5 }
                })
            })
            .collect();
        serde_json::json!({ "list": list })
    }

    #[test]
    fn test_heat_and_rain_advice() {
        let advice = farming_advice(38.0, "Rain");
        assert_eq!(advice.len(), 5);
        assert!(advice[0].starts_with("High temperature"));
        assert!(advice[3].starts_with("Rain expected"));
    }

    #[test]
    fn test_cold_advice() {
        let advice = farming_advice(5.0, "Clear");
        assert_eq!(advice.len(), 3);
        assert_eq!(advice[1], "Reduce irrigation frequency");
    }

    #[test]
    fn test_mild_weather_has_no_advice() {
        assert!(farming_advice(24.0, "Clouds").is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let client = WeatherClient::new("http://localhost:1", None);
        let err = client.report("delhi").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_report_from_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "delhi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(36.6, "Rain")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = WeatherClient::new(server.uri(), Some(SecretString::from("k")));
        let report = client.report("delhi").await.unwrap();

        assert_eq!(report.location, "Delhi");
        assert_eq!(report.current.temperature, 37);
        assert_eq!(report.current.wind_speed, Some(3.5));
        assert_eq!(report.forecast.len(), 5);
        assert_eq!(report.forecast[0].temp, 30);
        assert!((report.forecast[0].precipitation - 0.5).abs() < f64::EPSILON);
        assert_eq!(report.farming_advice.len(), 5);

        // Second call is served from cache; mocks expect one hit each
        let cached = client.report("Delhi").await.unwrap();
        assert_eq!(cached, report);
    }

    #[tokio::test]
    async fn test_unknown_city_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = WeatherClient::new(server.uri(), Some(SecretString::from("k")));
        let err = client.report("atlantis").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(msg) if msg == "City not found"));
    }
}

//! HTTP API server for AgroMitra
//!
//! Routes are grouped per area, each module exposing its own router:
//!
//! - `/api/farming/*` knowledge, prices, crops, weather, diagnosis, tasks
//! - `/api/soil-info` soil properties and texture
//! - `/api/detect-disease`, `/api/disease/*` image diagnosis
//! - `/api/farms/*` farm records
//! - `/api/community/*` community feed
//! - `/api/assistant/*` voice assistant sessions
//! - `/api/market/*` simulated market scraping

pub mod assistant;
pub mod community;
pub mod disease;
pub mod farming;
pub mod farms;
pub mod health;
pub mod market;
pub mod rate_limit;
pub mod soil;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agent::LocalBackend;
use crate::config::AgentConfig;
use crate::db::{CommunityRepo, DbPool, FarmRepo};
use crate::disease::DiseaseDetector;
use crate::farming::{KnowledgeBase, WeatherClient};
use crate::scraper::MarketScraper;
use crate::soil::SoilGridsClient;
use crate::{Config, Error, Result};

/// Shared state for API handlers
pub struct ApiState {
    pub db: DbPool,
    pub farms: FarmRepo,
    pub community: CommunityRepo,
    pub weather: WeatherClient,
    pub soil: SoilGridsClient,
    pub disease: DiseaseDetector,
    pub knowledge: Arc<KnowledgeBase>,
    pub scraper: Arc<MarketScraper>,
    pub sessions: assistant::Sessions,
    /// Defaults for new assistant sessions
    pub agent_defaults: AgentConfig,
    pub rate_limiter: Option<rate_limit::SharedLimiter>,
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("weather", &self.weather)
            .field("soil", &self.soil)
            .field("disease", &self.disease)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiState {
    /// Build handler state from configuration and an initialized database
    #[must_use]
    pub fn new(config: &Config, db: DbPool) -> Self {
        let upstream = &config.upstream;

        Self {
            farms: FarmRepo::new(db.clone()),
            community: CommunityRepo::new(db.clone()),
            db,
            weather: WeatherClient::new(
                upstream.openweather_url.clone(),
                config.api_keys.openweather.clone(),
            ),
            soil: SoilGridsClient::new(upstream.soilgrids_url.clone()),
            disease: DiseaseDetector::new(&config.api_keys, upstream),
            knowledge: Arc::new(KnowledgeBase::default()),
            scraper: Arc::new(MarketScraper::new()),
            sessions: assistant::session_store(assistant::SESSION_IDLE_TIMEOUT),
            agent_defaults: config.agent.clone(),
            rate_limiter: config
                .server
                .rate_limit_per_minute
                .map(rate_limit::create_limiter),
        }
    }

    /// Replace the market scraper (e.g. one without delays)
    #[must_use]
    pub fn with_scraper(mut self, scraper: MarketScraper) -> Self {
        self.scraper = Arc::new(scraper);
        self
    }

    /// Expire assistant sessions after `idle` without a request
    #[must_use]
    pub fn with_session_idle_timeout(mut self, idle: std::time::Duration) -> Self {
        self.sessions = assistant::session_store(idle);
        self
    }

    /// In-process backend over this state's services, used by assistant sessions
    #[must_use]
    pub fn local_backend(&self) -> LocalBackend {
        LocalBackend::new(
            self.weather.clone(),
            self.knowledge.clone(),
            self.farms.clone(),
        )
    }
}

/// `?user_id=` selector; absent or blank means the configured default user
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

impl UserQuery {
    fn resolve(self, state: &ApiState) -> String {
        self.user_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| state.agent_defaults.user_id.clone())
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Handler result with a JSON body
pub type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Error response with a status and message
pub fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            message: None,
        }),
    )
}

/// 400 with a message
pub fn bad_request(error: impl Into<String>) -> ApiError {
    error_response(StatusCode::BAD_REQUEST, error)
}

/// Map a crate error to a status code and body
pub fn api_error(err: Error) -> ApiError {
    let status = match &err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::ScrapeInProgress => StatusCode::CONFLICT,
        Error::Upstream(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }

    error_response(status, err.to_string())
}

/// Build the router with all routes and middleware
pub fn router(state: Arc<ApiState>) -> Router {
    let router = Router::new()
        .nest("/api/farming", farming::router(state.clone()))
        .nest("/api/farms", farms::router(state.clone()))
        .nest("/api/community", community::router(state.clone()))
        .nest("/api/assistant", assistant::router(state.clone()))
        .nest("/api/market", market::router(state.clone()))
        .nest("/api/disease", disease::router(state.clone()))
        .merge(disease::detect_router(state.clone()))
        .merge(soil::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state.clone()));

    let router = router.layer(axum::middleware::from_fn_with_state(
        state,
        rate_limit::rate_limit_middleware,
    ));

    // The web client is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// API server
#[derive(Debug)]
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub fn new(state: Arc<ApiState>, host: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            host: host.into(),
            port,
        }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        if self.state.rate_limiter.is_some() {
            tracing::info!("rate limiting active");
        }
        if !self.state.weather.is_configured() {
            tracing::warn!("OPENWEATHER_API_KEY not set, weather endpoints will fail");
        }
        if !self.state.disease.has_providers() {
            tracing::warn!("no disease providers configured, detection returns sample results");
        }

        tracing::info!(host = %self.host, port = self.port, "API server listening");

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

//! Simulated market scraping endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{ApiResult, ApiState, api_error};
use crate::scraper::commodities::{COMMODITIES, Commodity, MarketSource, SOURCES};
use crate::scraper::{ScrapeProgress, ScrapedPrice};

/// Case-insensitive substring filters; `all` or blank disables a filter
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeFilter {
    pub state: Option<String>,
    pub commodity: Option<String>,
    pub category: Option<String>,
}

fn matches(value: &str, filter: Option<&str>) -> bool {
    match filter.map(str::trim) {
        None | Some("" | "all") => true,
        Some(f) => value.to_lowercase().contains(&f.to_lowercase()),
    }
}

impl ScrapeFilter {
    fn accepts(&self, record: &ScrapedPrice) -> bool {
        matches(&record.state, self.state.as_deref())
            && matches(&record.commodity, self.commodity.as_deref())
            && matches(&record.category, self.category.as_deref())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    pub success: bool,
    pub data: Vec<ScrapedPrice>,
    pub total: usize,
    pub scraped_from: Vec<String>,
    pub scraping_time: u64,
    pub total_records_scraped: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub sources: &'static [MarketSource],
    pub commodities: &'static [Commodity],
}

/// Run a full scrape and return the filtered records; 409 while one is running
async fn scrape(
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<ScrapeFilter>,
) -> ApiResult<ScrapeResponse> {
    let result = state
        .scraper
        .scrape_market_prices(|p: ScrapeProgress| {
            tracing::debug!(percent = p.percent, status = %p.status, "scrape progress");
        })
        .await
        .map_err(api_error)?;

    let data: Vec<ScrapedPrice> = result
        .data
        .into_iter()
        .filter(|record| filter.accepts(record))
        .collect();

    Ok(Json(ScrapeResponse {
        success: result.success,
        total: data.len(),
        message: format!(
            "Successfully scraped {} records from {} sources",
            result.total_records,
            result.scraped_from.len()
        ),
        data,
        scraped_from: result.scraped_from,
        scraping_time: result.scraping_time,
        total_records_scraped: result.total_records,
        errors: result.errors,
    }))
}

async fn catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        sources: SOURCES,
        commodities: COMMODITIES,
    })
}

/// Build the market router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/scrape", post(scrape))
        .route("/commodities", get(catalog))
        .with_state(state)
}

//! Simulated market price scraper
//!
//! Pretends to scrape five Indian market portals. Each source takes a
//! randomized delay (reported as progress ticks) and yields fabricated price
//! records drawn from the commodity table. No network I/O happens.

pub mod commodities;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::farming::Trend;
use crate::{Error, Result};
use commodities::{COMMODITIES, GRADES, MARKET_KINDS, MarketSource, SOURCES};

const TICKS_PER_SOURCE: u32 = 10;
const STARTUP_DELAY: Duration = Duration::from_millis(500);
const BETWEEN_SOURCES_DELAY: Duration = Duration::from_millis(300);
const FINALIZE_DELAY: Duration = Duration::from_millis(500);

/// Outlook derived from the day's change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Forecast {
    Bullish,
    Bearish,
    Neutral,
}

/// One scraped price record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedPrice {
    pub id: String,
    pub commodity: String,
    pub category: String,
    pub current_price: u32,
    pub min_price: u32,
    pub max_price: u32,
    pub modal_price: u32,
    pub unit: String,
    pub change: i64,
    pub change_percent: f64,
    pub market: String,
    pub state: String,
    pub district: String,
    /// Variety name
    pub quality: String,
    pub grade: String,
    pub last_updated: String,
    pub trend: Trend,
    pub volume: String,
    pub forecast: Forecast,
    pub commodity_code: String,
    /// Arrival date as `dd/mm/yyyy`
    pub arrival_date: String,
    pub scraped_from: String,
    pub scraped_url: String,
    pub scraped_at: DateTime<Utc>,
}

/// Outcome of a full scrape
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub success: bool,
    pub data: Vec<ScrapedPrice>,
    pub scraped_from: Vec<String>,
    pub total_records: usize,
    /// Milliseconds
    pub scraping_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Progress notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeProgress {
    pub percent: u8,
    pub status: String,
}

/// Clears the active flag on every exit path
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shared scraper; at most one scrape runs at a time
#[derive(Debug)]
pub struct MarketScraper {
    active: AtomicBool,
    delay_scale: f64,
    seed: Option<u64>,
}

impl Default for MarketScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketScraper {
    /// Scraper with realistic delays
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            delay_scale: 1.0,
            seed: None,
        }
    }

    /// Multiply every simulated delay by `scale`; zero disables them
    #[must_use]
    pub fn with_delay_scale(mut self, scale: f64) -> Self {
        self.delay_scale = scale.max(0.0);
        self
    }

    /// Draw from a fixed seed so runs repeat
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether a scrape is running
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    async fn pause(&self, duration: Duration) {
        if self.delay_scale > 0.0 {
            tokio::time::sleep(duration.mul_f64(self.delay_scale)).await;
        }
    }

    /// Scrape every source in turn
    ///
    /// # Errors
    ///
    /// Returns `Error::ScrapeInProgress` if another scrape is running
    pub async fn scrape_market_prices(
        &self,
        mut progress: impl FnMut(ScrapeProgress) + Send,
    ) -> Result<ScrapeResult> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::ScrapeInProgress);
        }
        let _guard = ActiveGuard(&self.active);

        let mut rng = self
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let started = Instant::now();
        let mut percent = 0.0_f64;
        let mut report = |percent: f64, status: String| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let percent = percent.round().clamp(0.0, 100.0) as u8;
            progress(ScrapeProgress { percent, status });
        };

        tracing::info!(sources = SOURCES.len(), "starting market scrape");
        report(0.0, "Initializing web scraper...".to_string());
        self.pause(STARTUP_DELAY).await;

        let mut data = Vec::new();
        let mut scraped_from = Vec::new();
        #[allow(clippy::cast_precision_loss)]
        let per_tick = 100.0 / SOURCES.len() as f64 / f64::from(TICKS_PER_SOURCE);

        for source in SOURCES {
            report(percent, format!("Starting to scrape {}...", source.name));
            report(percent, format!("Connecting to {}...", source.name));

            let duration = Duration::from_millis(1000 + rng.gen_range(0..2000));
            let tick = duration / TICKS_PER_SOURCE;
            for i in 0..=TICKS_PER_SOURCE {
                self.pause(tick).await;
                percent = (percent + per_tick).min(100.0);
                report(
                    percent,
                    format!(
                        "Scraping {}... ({}%)",
                        source.name,
                        i * 100 / TICKS_PER_SOURCE
                    ),
                );
            }

            let records = fabricate_records(source, &mut rng, Utc::now());
            report(
                percent,
                format!(
                    "Successfully scraped {} records from {}",
                    records.len(),
                    source.name
                ),
            );
            tracing::debug!(source = source.name, records = records.len(), "source scraped");

            data.extend(records);
            scraped_from.push(source.name.to_string());
            self.pause(BETWEEN_SOURCES_DELAY).await;
        }

        report(95.0, "Processing and validating scraped data...".to_string());
        self.pause(FINALIZE_DELAY).await;
        report(
            100.0,
            format!("Scraping completed! Found {} price records", data.len()),
        );

        let scraping_time = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(records = data.len(), ms = scraping_time, "market scrape finished");

        Ok(ScrapeResult {
            success: true,
            total_records: data.len(),
            data,
            scraped_from,
            scraping_time,
            errors: None,
        })
    }
}

fn pick<'a, R: Rng>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_price(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Human-readable age of `then` relative to `now`
#[must_use]
pub fn time_ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let diff = now - then;
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} minutes ago")
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else if days == 1 {
        "1 day ago".to_string()
    } else {
        format!("{days} days ago")
    }
}

fn fabricate_records<R: Rng>(
    source: &MarketSource,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<ScrapedPrice> {
    let count = rng.gen_range(15..40);
    (1..=count)
        .map(|i| fabricate_record(source, i, rng, now))
        .collect()
}

fn fabricate_record<R: Rng>(
    source: &MarketSource,
    index: usize,
    rng: &mut R,
    now: DateTime<Utc>,
) -> ScrapedPrice {
    let commodity = &COMMODITIES[rng.gen_range(0..COMMODITIES.len())];
    let variety = pick(rng, commodity.varieties);
    let state = pick(rng, commodity.states);
    let market = format!("{state} {}", pick(rng, MARKET_KINDS));

    let (low, high) = commodity.price_range;
    let base = f64::from(low) + rng.gen_range(0.0..1.0) * f64::from(high - low);
    let market_variation = 1.0 + (rng.gen_range(0.0..1.0) - 0.5) * 0.3;
    let premium = if variety.contains("Premium") || variety.contains("Bold") {
        1.1
    } else {
        1.0
    };
    let current_price = round_price(base * market_variation * premium);

    let change_percent = (rng.gen_range(0.0_f64..1.0) - 0.5) * 20.0;
    #[allow(clippy::cast_possible_truncation)]
    let change = (rng.gen_range(0.0_f64..1.0) * 500.0 * change_percent.signum()).round() as i64;
    let trend = if change_percent.abs() > 1.0 {
        if change_percent > 0.0 { Trend::Up } else { Trend::Down }
    } else {
        Trend::Stable
    };
    let change_percent = (change_percent * 100.0).round() / 100.0;
    let forecast = if change_percent > 2.0 {
        Forecast::Bullish
    } else if change_percent < -2.0 {
        Forecast::Bearish
    } else {
        Forecast::Neutral
    };

    let price = f64::from(current_price);
    let min_price = round_price(price * rng.gen_range(0.85..0.95));
    let max_price = round_price(price * rng.gen_range(1.05..1.15));
    let modal_price = round_price(f64::from(min_price + max_price + current_price) / 3.0);

    let arrival = now - chrono::Duration::days(rng.gen_range(0..7));

    ScrapedPrice {
        id: format!("scraped-{}-{index}", source.name),
        commodity: commodity.name.to_string(),
        category: commodity.category.to_string(),
        current_price,
        min_price,
        max_price,
        modal_price,
        unit: commodity.unit.to_string(),
        change,
        change_percent,
        market,
        state: state.to_string(),
        district: format!("{state} District"),
        quality: variety.to_string(),
        grade: pick(rng, GRADES).to_string(),
        last_updated: time_ago(now, arrival),
        trend,
        volume: format!("{} quintals", rng.gen_range(50..2050)),
        forecast,
        commodity_code: rng.gen_range(10..100).to_string(),
        arrival_date: arrival.format("%d/%m/%Y").to_string(),
        scraped_from: source.name.to_string(),
        scraped_url: source.url.to_string(),
        scraped_at: now,
    }
}

//! Static mandi price board

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Price direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
    #[serde(other)]
    Unknown,
}

/// A market price record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPrice {
    pub crop: String,
    pub price: u32,
    pub unit: String,
    pub market: String,
    pub date: String,
    pub trend: Trend,
}

const PRICE_BOARD: &[(&str, u32, &str, Trend)] = &[
    ("Rice", 2500, "Local Mandi", Trend::Up),
    ("Wheat", 2200, "Local Mandi", Trend::Stable),
    ("Maize", 1800, "Local Mandi", Trend::Down),
    ("Tomato", 3000, "Local Market", Trend::Up),
    ("Onion", 2800, "Local Market", Trend::Stable),
    ("Potato", 1500, "Local Market", Trend::Up),
];

/// Today's prices, optionally filtered by a case-insensitive crop substring
#[must_use]
pub fn market_prices(crop: Option<&str>, today: NaiveDate) -> Vec<MarketPrice> {
    let filter = crop
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase);
    let date = today.format("%Y-%m-%d").to_string();

    PRICE_BOARD
        .iter()
        .filter(|(name, ..)| {
            filter
                .as_deref()
                .is_none_or(|f| name.to_lowercase().contains(f))
        })
        .map(|(name, price, market, trend)| MarketPrice {
            crop: (*name).to_string(),
            price: *price,
            unit: "per quintal".to_string(),
            market: (*market).to_string(),
            date: date.clone(),
            trend: *trend,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_unfiltered_board() {
        let prices = market_prices(None, day());
        assert_eq!(prices.len(), 6);
        assert!(prices.iter().all(|p| p.date == "2025-03-14"));
        assert_eq!(prices[2].trend, Trend::Down);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let prices = market_prices(Some("TOM"), day());
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].crop, "Tomato");
        assert_eq!(prices[0].market, "Local Market");
    }

    #[test]
    fn test_unknown_crop_is_empty() {
        assert!(market_prices(Some("saffron"), day()).is_empty());
    }

    #[test]
    fn test_unknown_trend_deserializes() {
        let price: MarketPrice = serde_json::from_str(
            r#"{"crop":"Gram","price":5000,"unit":"per quintal","market":"X","date":"2025-01-01","trend":"volatile"}"#,
        )
        .unwrap();
        assert_eq!(price.trend, Trend::Unknown);
    }
}

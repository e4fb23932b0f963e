//! Farming backend services
//!
//! Static knowledge, price and task tables plus the weather integration that
//! back the `/api/farming` endpoints and the assistant's local backend.

pub mod crops;
pub mod diagnosis;
pub mod knowledge;
pub mod market;
pub mod tasks;
pub mod weather;

pub use crops::{CropRecommendation, CropRecommendationRequest, recommend_crops};
pub use diagnosis::{Diagnosis, DiagnosisConfidence, diagnose_symptoms};
pub use knowledge::{KnowledgeBase, KnowledgeEntry, KnowledgeHit};
pub use market::{MarketPrice, Trend, market_prices};
pub use tasks::{Season, TaskCategory, TaskPriority, TaskRecommendation, seasonal_tasks};
pub use weather::{CurrentConditions, ForecastDay, WeatherClient, WeatherReport, farming_advice};
